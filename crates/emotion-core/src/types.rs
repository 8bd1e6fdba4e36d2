use serde::{Deserialize, Serialize};

/// The seven expression categories the pretrained network distinguishes.
///
/// Variant order matches the classifier's output vector; `from_index`
/// maps a raw output index back to its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Disgusted,
    Fearful,
    Happy,
    Neutral,
    Sad,
    Surprised,
}

impl Emotion {
    /// All classes in classifier output order.
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgusted,
        Emotion::Fearful,
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Surprised,
    ];

    /// Map a classifier output index to its label.
    pub fn from_index(index: usize) -> Option<Emotion> {
        Self::ALL.get(index).copied()
    }

    /// Lowercase label as persisted and served.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgusted => "disgusted",
            Emotion::Fearful => "fearful",
            Emotion::Happy => "happy",
            Emotion::Neutral => "neutral",
            Emotion::Sad => "sad",
            Emotion::Surprised => "surprised",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounding box for a detected face, in pixel coordinates of the source image.
///
/// The cascade may report boxes partially outside the image; callers clamp
/// before cropping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Raw cascade score (unbounded, larger = more face-like).
    pub score: f64,
}

impl FaceBox {
    /// Box area in pixels, used to pick the primary subject.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Outcome of classifying one face crop.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub emotion: Emotion,
    /// Maximum softmax probability for the chosen class, in [0, 1].
    pub confidence: f32,
}

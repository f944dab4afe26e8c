use super::error::GenerationError;
use serde::{Deserialize, Serialize};

/// Longest clip the generator will produce, in seconds.
pub const DEFAULT_MAX_DURATION_SEC: u32 = 30;

const SLOW_TEMPO_BELOW: i64 = 80;
const FAST_TEMPO_ABOVE: i64 = 140;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub key: String,
    #[serde(default)]
    pub instruments: Vec<String>,
    pub mood: String,
    pub genre: String,
    #[serde(default)]
    pub chords: Option<String>,
    pub tempo: i64,
    /// Requested length in seconds.
    pub duration: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoBucket {
    Slow,
    Medium,
    Fast,
}

impl TempoBucket {
    pub fn from_bpm(tempo: i64) -> Self {
        if tempo < SLOW_TEMPO_BELOW {
            TempoBucket::Slow
        } else if tempo > FAST_TEMPO_ABOVE {
            TempoBucket::Fast
        } else {
            TempoBucket::Medium
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TempoBucket::Slow => "slow",
            TempoBucket::Medium => "medium",
            TempoBucket::Fast => "fast",
        }
    }
}

impl GenerationRequest {
    pub fn tempo_bucket(&self) -> TempoBucket {
        TempoBucket::from_bpm(self.tempo)
    }

    pub fn clamped_duration(&self, max_duration: u32) -> u32 {
        self.duration.min(max_duration)
    }

    /// Rejects requests that cannot produce a meaningful prompt or clip.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let blank = [("key", &self.key), ("mood", &self.mood), ("genre", &self.genre)]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());
        if let Some((field, _)) = blank {
            return Err(GenerationError::InvalidRequest(format!(
                "{} must not be empty",
                field
            )));
        }
        if self.tempo <= 0 {
            return Err(GenerationError::InvalidRequest(format!(
                "tempo must be positive, got {}",
                self.tempo
            )));
        }
        if self.duration == 0 {
            return Err(GenerationError::InvalidRequest(
                "duration must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_request() -> GenerationRequest {
    GenerationRequest {
        key: "C major".to_string(),
        instruments: vec!["piano".to_string()],
        mood: "happy".to_string(),
        genre: "jazz".to_string(),
        chords: None,
        tempo: 120,
        duration: 10,
    }
}

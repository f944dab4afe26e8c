use crate::generation::{GeneratedAudio, GenerationRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted record of a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creation {
    pub id: String,
    pub title: String,
    pub key: String,
    pub genre: String,
    pub mood: String,
    pub instruments: Vec<String>,
    pub prompt: String,
    pub duration_seconds: u32,
    pub sample_rate: u32,
    pub backend: String,
    pub audio_url: String,
    pub created_at: DateTime<Utc>,
}

impl Creation {
    pub fn title_for(request: &GenerationRequest) -> String {
        format!("{} {} in {}", request.mood, request.genre, request.key)
    }

    pub fn from_generation(request: &GenerationRequest, audio: &GeneratedAudio) -> Self {
        Self {
            id: audio.id.clone(),
            title: Self::title_for(request),
            key: request.key.clone(),
            genre: request.genre.clone(),
            mood: request.mood.clone(),
            instruments: request.instruments.clone(),
            prompt: audio.prompt.clone(),
            duration_seconds: audio.duration_seconds,
            sample_rate: audio.sample_rate,
            backend: audio.backend.clone(),
            audio_url: audio.audio_url(),
            created_at: audio.generated_at,
        }
    }

    /// Name of the WAV file backing this creation.
    pub fn file_name(&self) -> String {
        format!("{}.wav", self.id)
    }
}

#[cfg(test)]
pub(crate) fn sample_creation(id: &str, created_at: DateTime<Utc>) -> Creation {
    Creation {
        id: id.to_string(),
        title: "happy jazz in C major".to_string(),
        key: "C major".to_string(),
        genre: "jazz".to_string(),
        mood: "happy".to_string(),
        instruments: vec!["piano".to_string(), "bass".to_string()],
        prompt: "happy jazz music in C major, medium tempo, with piano and bass".to_string(),
        duration_seconds: 10,
        sample_rate: 32000,
        backend: "fallback".to_string(),
        audio_url: format!("/generated_audio/{}.wav", id),
        created_at,
    }
}

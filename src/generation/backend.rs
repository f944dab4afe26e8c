use super::model::TextToAudio;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Audio source chosen once at startup.
#[derive(Clone)]
pub enum AudioBackend {
    Model(Arc<dyn TextToAudio>),
    Fallback,
}

impl AudioBackend {
    /// Probes the model, if any, and falls back to the synthesizer when it
    /// is missing or unhealthy. The result is never re-evaluated.
    pub async fn select(model: Option<Arc<dyn TextToAudio>>) -> Self {
        let Some(model) = model else {
            info!("No audio model configured, using fallback synthesizer");
            return AudioBackend::Fallback;
        };
        match model.health_check().await {
            Ok(()) => {
                info!("Using audio model {} ({})", model.model(), model.name());
                AudioBackend::Model(model)
            }
            Err(e) => {
                warn!(
                    "Audio model {} unavailable, using fallback synthesizer: {}",
                    model.model(),
                    e
                );
                AudioBackend::Fallback
            }
        }
    }

    /// Label reported in responses and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            AudioBackend::Model(_) => "model",
            AudioBackend::Fallback => "fallback",
        }
    }

    pub fn model_name(&self) -> Option<&str> {
        match self {
            AudioBackend::Model(model) => Some(model.model()),
            AudioBackend::Fallback => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AudioBackend::Fallback)
    }
}

impl fmt::Debug for AudioBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioBackend::Model(model) => f.debug_tuple("Model").field(&model.model()).finish(),
            AudioBackend::Fallback => f.write_str("Fallback"),
        }
    }
}

//! Request to WAV file: prompt, backend dispatch, quantization and write.

use super::backend::AudioBackend;
use super::error::GenerationError;
use super::model::{ModelError, TOKENS_PER_SECOND};
use super::prompt::build_prompt;
use super::request::{GenerationRequest, DEFAULT_MAX_DURATION_SEC};
use super::sink::AudioSink;
use super::synth::{quantize, synthesize_fallback, DEFAULT_SAMPLE_RATE};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// URL prefix under which generated files are served.
pub const AUDIO_URL_PREFIX: &str = "/generated_audio";

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedAudio {
    pub id: String,
    pub sample_rate: u32,
    #[serde(skip)]
    pub samples: Vec<i16>,
    pub path: PathBuf,
    pub duration_seconds: u32,
    pub prompt: String,
    pub backend: String,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedAudio {
    pub fn file_name(&self) -> String {
        format!("{}.wav", self.id)
    }

    pub fn audio_url(&self) -> String {
        format!("{}/{}", AUDIO_URL_PREFIX, self.file_name())
    }
}

#[derive(Clone)]
pub struct Generator {
    backend: AudioBackend,
    sink: Arc<dyn AudioSink>,
    max_duration: u32,
    fallback_sample_rate: u32,
}

impl Generator {
    pub fn new(backend: AudioBackend, sink: Arc<dyn AudioSink>) -> Self {
        Self {
            backend,
            sink,
            max_duration: DEFAULT_MAX_DURATION_SEC,
            fallback_sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// A generator that never consults a model.
    pub fn fallback_only(sink: Arc<dyn AudioSink>) -> Self {
        Self::new(AudioBackend::Fallback, sink)
    }

    pub fn with_limits(mut self, max_duration: u32, fallback_sample_rate: u32) -> Self {
        self.max_duration = max_duration;
        self.fallback_sample_rate = fallback_sample_rate;
        self
    }

    pub fn backend(&self) -> &AudioBackend {
        &self.backend
    }

    pub fn max_duration(&self) -> u32 {
        self.max_duration
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedAudio, GenerationError> {
        request.validate()?;

        let duration = request.clamped_duration(self.max_duration);
        let prompt = build_prompt(request);
        debug!("Generating {}s with {:?}: '{}'", duration, self.backend, prompt);

        let (samples, sample_rate) = match &self.backend {
            AudioBackend::Fallback => {
                let rate = self.fallback_sample_rate;
                let samples = tokio::task::spawn_blocking(move || {
                    synthesize_fallback(duration as f64, rate)
                })
                .await
                .map_err(|e| GenerationError::Synthesis(e.to_string()))?;
                (samples, rate)
            }
            AudioBackend::Model(model) => {
                let max_new_tokens = TOKENS_PER_SECOND.checked_mul(duration).ok_or_else(|| {
                    GenerationError::InvalidRequest(format!(
                        "duration of {} seconds is too long",
                        duration
                    ))
                })?;
                let waveform = model.generate(&prompt, max_new_tokens).await?;
                if waveform.samples.is_empty() {
                    return Err(ModelError::InvalidResponse("empty waveform".to_string()).into());
                }
                let signal: Vec<f64> = waveform.samples.iter().map(|s| *s as f64).collect();
                (quantize(&signal, 1.0), waveform.sample_rate)
            }
        };

        let id = Uuid::new_v4().to_string();
        let sink = self.sink.clone();
        let write_id = id.clone();
        let (path, samples) = tokio::task::spawn_blocking(move || {
            sink.write(&write_id, &samples, sample_rate)
                .map(|path| (path, samples))
        })
        .await
        .map_err(|e| GenerationError::Synthesis(format!("Writer task failed: {}", e)))??;

        info!(
            "Generated {} ({} samples at {} Hz, backend {})",
            id,
            samples.len(),
            sample_rate,
            self.backend.label()
        );

        Ok(GeneratedAudio {
            id,
            sample_rate,
            samples,
            path,
            duration_seconds: duration,
            prompt,
            backend: self.backend.label().to_string(),
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::model::{RawWaveform, TextToAudio};
    use crate::generation::request::sample_request;
    use crate::generation::sink::{read_wav, WavFileSink};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct ScriptedModel {
        result: Result<Vec<f32>, ()>,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl ScriptedModel {
        fn new(result: Result<Vec<f32>, ()>) -> Self {
            Self {
                result,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextToAudio for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn health_check(&self) -> Result<(), ModelError> {
            Ok(())
        }

        async fn generate(
            &self,
            prompt: &str,
            max_new_tokens: u32,
        ) -> Result<RawWaveform, ModelError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_new_tokens));
            match &self.result {
                Ok(samples) => Ok(RawWaveform {
                    sample_rate: 32000,
                    samples: samples.clone(),
                }),
                Err(()) => Err(ModelError::Api {
                    status: 500,
                    message: "CUDA out of memory".to_string(),
                }),
            }
        }
    }

    fn wav_count(dir: &std::path::Path) -> usize {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    #[tokio::test]
    async fn fallback_clamps_duration() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::fallback_only(Arc::new(WavFileSink::new(dir.path())));
        let mut request = sample_request();
        request.duration = 45;

        let audio = generator.generate(&request).await.unwrap();
        assert_eq!(audio.duration_seconds, 30);
        assert_eq!(audio.samples.len(), 30 * 32000);
        assert_eq!(audio.sample_rate, 32000);
        assert_eq!(audio.backend, "fallback");
    }

    #[tokio::test]
    async fn written_file_matches_samples() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::fallback_only(Arc::new(WavFileSink::new(dir.path())));
        let mut request = sample_request();
        request.duration = 1;

        let audio = generator.generate(&request).await.unwrap();
        assert!(Uuid::parse_str(&audio.id).is_ok());
        assert_eq!(audio.path, dir.path().join(audio.file_name()));
        assert_eq!(audio.audio_url(), format!("/generated_audio/{}.wav", audio.id));
        assert_eq!(audio.prompt, "happy jazz music in C major, medium tempo, with piano");

        let (samples, rate) = read_wav(&audio.path).unwrap();
        assert_eq!(rate, 32000);
        assert_eq!(samples, audio.samples);
    }

    #[tokio::test]
    async fn each_generation_gets_a_new_id() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::fallback_only(Arc::new(WavFileSink::new(dir.path())));
        let mut request = sample_request();
        request.duration = 1;

        let first = generator.generate(&request).await.unwrap();
        let second = generator.generate(&request).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(wav_count(dir.path()), 2);
    }

    #[tokio::test]
    async fn model_output_is_normalized() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::new(Ok(vec![0.0, 0.25, -0.5])));
        let generator = Generator::new(
            AudioBackend::Model(model.clone()),
            Arc::new(WavFileSink::new(dir.path())),
        );
        let mut request = sample_request();
        request.duration = 45;

        let audio = generator.generate(&request).await.unwrap();
        assert_eq!(audio.samples, vec![0, 16383, -32767]);
        assert_eq!(audio.backend, "model");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, 256 * 30);
    }

    #[tokio::test]
    async fn model_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::new(Err(())));
        let generator = Generator::new(
            AudioBackend::Model(model),
            Arc::new(WavFileSink::new(dir.path())),
        );

        let err = generator.generate(&sample_request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Model(_)));
        assert!(err.to_string().contains("CUDA out of memory"));
        assert_eq!(wav_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn silent_model_output_is_zeros() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::new(Ok(vec![0.0; 4])));
        let generator = Generator::new(
            AudioBackend::Model(model),
            Arc::new(WavFileSink::new(dir.path())),
        );
        let audio = generator.generate(&sample_request()).await.unwrap();
        assert_eq!(audio.samples, vec![0; 4]);
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_before_generation() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::fallback_only(Arc::new(WavFileSink::new(dir.path())));
        let mut request = sample_request();
        request.genre = String::new();

        let err = generator.generate(&request).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(wav_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn sink_failure_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let generator = Generator::fallback_only(Arc::new(WavFileSink::new(&blocker)));
        let mut request = sample_request();
        request.duration = 1;

        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err, GenerationError::Write(_)));
    }

    #[tokio::test]
    async fn token_overflow_is_rejected_before_calling_model() {
        let dir = TempDir::new().unwrap();
        let model = Arc::new(ScriptedModel::new(Ok(vec![0.0; 4])));
        let generator = Generator::new(
            AudioBackend::Model(model.clone()),
            Arc::new(WavFileSink::new(dir.path())),
        )
        .with_limits(u32::MAX, DEFAULT_SAMPLE_RATE);
        let mut request = sample_request();
        request.duration = u32::MAX;

        let err = generator.generate(&request).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(model.calls.lock().unwrap().is_empty());
        assert_eq!(wav_count(dir.path()), 0);
    }
}

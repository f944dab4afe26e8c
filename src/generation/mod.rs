//! Music generation: prompt building, audio backends and file output.

mod backend;
mod error;
mod generator;
mod model;
mod prompt;
mod request;
mod sink;
mod synth;

pub use backend::AudioBackend;
pub use error::GenerationError;
pub use generator::{GeneratedAudio, Generator, AUDIO_URL_PREFIX};
pub use model::{HttpTextToAudio, ModelError, RawWaveform, TextToAudio, TOKENS_PER_SECOND};
pub use prompt::build_prompt;
pub use request::{GenerationRequest, TempoBucket, DEFAULT_MAX_DURATION_SEC};
pub use sink::{read_wav, AudioSink, SinkError, WavFileSink};
pub use synth::{quantize, synthesize_fallback, DEFAULT_SAMPLE_RATE};

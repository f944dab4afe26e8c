//! Waveform persistence.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WAV encoding error on {path:?}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

/// Destination for finished waveforms.
///
/// Writes are blocking; callers on the async runtime should move them to a
/// blocking thread.
pub trait AudioSink: Send + Sync {
    /// Persists `samples` under `id` and returns where they landed.
    fn write(&self, id: &str, samples: &[i16], sample_rate: u32) -> Result<PathBuf, SinkError>;

    /// Directory holding the written files.
    fn output_dir(&self) -> &Path;
}

/// Writes mono 16-bit PCM WAV files named `{id}.wav`.
#[derive(Debug, Clone)]
pub struct WavFileSink {
    output_dir: PathBuf,
}

impl WavFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.output_dir.join(format!("{}.wav", id))
    }

    fn write_file(path: &Path, samples: &[i16], sample_rate: u32) -> Result<(), hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()
    }
}

impl AudioSink for WavFileSink {
    fn write(&self, id: &str, samples: &[i16], sample_rate: u32) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| SinkError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.path_for(id);
        if let Err(source) = Self::write_file(&path, samples, sample_rate) {
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Failed to remove partial audio file {:?}: {}", path, e);
                }
            }
            return Err(SinkError::Wav { path, source });
        }

        debug!("Wrote {} samples at {} Hz to {:?}", samples.len(), sample_rate, path);
        Ok(path)
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Reads a mono 16-bit WAV file back, returning samples and sample rate.
pub fn read_wav(path: &Path) -> Result<(Vec<i16>, u32), SinkError> {
    let wav_err = |source| SinkError::Wav {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = WavReader::open(path).map_err(wav_err)?;
    let sample_rate = reader.spec().sample_rate;
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(wav_err)?;
    Ok((samples, sample_rate))
}

use std::path::Path;
use std::process::ExitStatus;

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::debug;

use super::tempo;

/// Sample rate all audio is resampled to before analysis.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22_050;

/// Result alias for analyzer calls.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors produced while decoding and measuring audio.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The decoder binary could not be started.
    #[error("failed to launch {binary}")]
    Launch {
        /// Binary we tried to run.
        binary: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
    /// The decoder ran but exited unsuccessfully.
    #[error("{binary} exited with {status}: {stderr}")]
    Decode {
        /// Binary that failed.
        binary: String,
        /// Its exit status.
        status: ExitStatus,
        /// Trimmed stderr tail for diagnostics.
        stderr: String,
    },
    /// The decoder produced no samples at all.
    #[error("decoded audio stream is empty")]
    EmptyStream,
}

/// Musical measurements extracted from one audio file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFeatures {
    /// Estimated tempo in beats per minute.
    pub bpm: f32,
    /// Duration in seconds.
    pub duration: f32,
}

/// Extracts [`AudioFeatures`] from an audio file on disk.
pub trait AudioAnalyzer: Send + Sync {
    /// Decode and measure the file at `path`.
    fn analyze(&self, path: &Path) -> BoxFuture<'static, AnalyzerResult<AudioFeatures>>;
}

/// Reinterpret little-endian f32le bytes as samples, ignoring a ragged tail.
fn bytes_to_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Analyzer that shells out to ffmpeg for decoding.
///
/// The file is decoded to mono f32le at [`ANALYSIS_SAMPLE_RATE`], then the
/// duration falls out of the sample count and the tempo comes from
/// [`tempo::estimate_bpm`].
#[derive(Clone)]
pub struct FfmpegAnalyzer {
    binary: String,
}

impl FfmpegAnalyzer {
    /// Build an analyzer around the given ffmpeg binary.
    pub fn new(binary: String) -> Self {
        Self { binary }
    }
}

impl AudioAnalyzer for FfmpegAnalyzer {
    fn analyze(&self, path: &Path) -> BoxFuture<'static, AnalyzerResult<AudioFeatures>> {
        let binary = self.binary.clone();
        let path = path.to_path_buf();
        Box::pin(async move {
            debug!(path = %path.display(), "decoding audio for analysis");
            let output = tokio::process::Command::new(&binary)
                .args(["-hide_banner", "-loglevel", "error"])
                .arg("-i")
                .arg(&path)
                .args(["-f", "f32le"])
                .args(["-ac", "1"])
                .args(["-ar", &ANALYSIS_SAMPLE_RATE.to_string()])
                .arg("-")
                .output()
                .await
                .map_err(|source| AnalyzerError::Launch {
                    binary: binary.clone(),
                    source,
                })?;

            if !output.status.success() {
                return Err(AnalyzerError::Decode {
                    binary,
                    status: output.status,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                });
            }

            let samples = bytes_to_samples(&output.stdout);
            if samples.is_empty() {
                return Err(AnalyzerError::EmptyStream);
            }

            let duration = samples.len() as f32 / ANALYSIS_SAMPLE_RATE as f32;
            let bpm = tempo::estimate_bpm(&samples, ANALYSIS_SAMPLE_RATE);
            Ok(AudioFeatures { bpm, duration })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_become_little_endian_samples() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0.5f32.to_le_bytes());
        bytes.extend_from_slice(&(-1.0f32).to_le_bytes());
        assert_eq!(bytes_to_samples(&bytes), vec![0.5, -1.0]);
    }

    #[test]
    fn ragged_tail_is_ignored() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&[0x01, 0x02]);
        assert_eq!(bytes_to_samples(&bytes), vec![1.0]);
    }

    #[test]
    fn empty_input_yields_no_samples() {
        assert!(bytes_to_samples(&[]).is_empty());
    }
}

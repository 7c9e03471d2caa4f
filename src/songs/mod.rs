//! Song pipeline: provider search and download, audio analysis, difficulty
//! grading and chart generation.

pub mod acquire;
pub mod analyze;
pub mod difficulty;
pub mod pattern;
pub mod provider;
pub mod tempo;

pub use self::acquire::{AcquireError, AcquisitionPipeline, SongAsset, sanitize_name};
pub use self::analyze::{AnalyzerError, AudioAnalyzer, AudioFeatures, FfmpegAnalyzer};
pub use self::difficulty::Difficulty;
pub use self::provider::{ProviderError, TrackCandidate, TrackProvider, YtDlpProvider};

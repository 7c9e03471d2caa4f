use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::health::FeedHealth;
use crate::vision::Gesture;

/// Snapshot of server internals for the debug overlay.
#[derive(Debug, Serialize, ToSchema)]
pub struct DebugInfo {
    /// Server version.
    pub version: String,
    /// Per-feed liveness, same shape as the healthcheck.
    pub feeds: Vec<FeedHealth>,
    /// Directory audio files are stored in.
    pub media_dir: String,
    /// Audio files currently on disk.
    pub song_files: Vec<String>,
    /// Whether the chart store file exists yet.
    pub patterns_file_exists: bool,
    /// Song keys with a stored chart.
    pub pattern_keys: Vec<String>,
}

/// Shortened view of one stored chart.
#[derive(Debug, Serialize, ToSchema)]
pub struct PatternSummary {
    /// Total number of beats.
    pub length: usize,
    /// First few beats of the chart.
    pub sample: Vec<Gesture>,
    /// Distinct gestures the chart uses.
    pub gestures_used: Vec<Gesture>,
}

/// Every stored chart, summarized.
#[derive(Debug, Serialize, ToSchema)]
pub struct PatternSummariesResponse {
    /// Summaries keyed by song key, in storage order.
    pub patterns: IndexMap<String, PatternSummary>,
}

/// One full chart.
#[derive(Debug, Serialize, ToSchema)]
pub struct PatternDetail {
    /// Song key the chart belongs to.
    pub song: String,
    /// Total number of beats.
    pub length: usize,
    /// The chart itself, beat by beat.
    pub pattern: Vec<Gesture>,
}

/// Log line forwarded from the frontend.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ClientLogRequest {
    /// Severity to log at.
    #[serde(default)]
    pub level: ClientLogLevel,
    /// Message to log.
    #[validate(length(min = 1, message = "Log message must not be empty"))]
    pub message: String,
}

/// Severity levels the frontend can log at.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientLogLevel {
    /// Developer noise.
    Debug,
    /// Normal events.
    #[default]
    Info,
    /// Something looks wrong.
    Warn,
    /// Something broke.
    Error,
}

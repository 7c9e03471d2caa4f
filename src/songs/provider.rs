use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SongsConfig;

/// Result alias for track provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors produced while talking to the external track provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider binary could not be started.
    #[error("failed to launch {binary}")]
    Launch {
        /// Binary we tried to run.
        binary: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
    /// The provider ran but exited unsuccessfully.
    #[error("{binary} exited with {status}: {stderr}")]
    Failed {
        /// Binary that failed.
        binary: String,
        /// Its exit status.
        status: ExitStatus,
        /// Trimmed stderr tail for diagnostics.
        stderr: String,
    },
}

/// One playable track offered by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCandidate {
    /// Provider-side identifier, used later to download.
    pub id: String,
    /// Human-readable title.
    pub title: String,
}

/// Source of tracks: searching the catalog and fetching audio.
pub trait TrackProvider: Send + Sync {
    /// Search the catalog for tracks matching `query`.
    fn search(&self, query: &str) -> BoxFuture<'static, ProviderResult<Vec<TrackCandidate>>>;

    /// Download the audio of `track_id` into `dest_dir`, named after `key`.
    fn download(
        &self,
        track_id: &str,
        dest_dir: PathBuf,
        key: String,
    ) -> BoxFuture<'static, ProviderResult<()>>;
}

#[derive(Debug, Deserialize)]
struct SearchRow {
    id: String,
    title: Option<String>,
}

/// Parse yt-dlp `--dump-json --flat-playlist` output, one JSON object per
/// line. Unparsable lines are skipped so one odd entry never sinks a search.
fn parse_search_lines(stdout: &str, limit: usize) -> Vec<TrackCandidate> {
    let mut results = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<SearchRow>(line) {
            Ok(row) => {
                results.push(TrackCandidate {
                    id: row.id,
                    title: row.title.unwrap_or_else(|| "Unknown title".to_owned()),
                });
                if results.len() == limit {
                    break;
                }
            }
            Err(err) => warn!("skipping unparsable search result line: {err}"),
        }
    }
    results
}

fn stderr_tail(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr).trim().to_owned()
}

/// Track provider backed by the yt-dlp binary.
///
/// Both operations wait out a configured throttle before touching the
/// network so back-to-back requests cannot hammer the remote service.
#[derive(Clone)]
pub struct YtDlpProvider {
    binary: String,
    search_limit: usize,
    throttle: Duration,
    audio_format: String,
    audio_quality: String,
}

impl YtDlpProvider {
    /// Build a provider from the songs configuration.
    pub fn new(config: &SongsConfig) -> Self {
        Self {
            binary: config.provider_binary.clone(),
            search_limit: config.search_limit,
            throttle: config.throttle(),
            audio_format: config.audio_format.clone(),
            audio_quality: config.audio_quality.clone(),
        }
    }

    async fn run(&self, args: Vec<String>) -> ProviderResult<String> {
        tokio::time::sleep(self.throttle).await;

        debug!(binary = %self.binary, "running track provider");
        let output = tokio::process::Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|source| ProviderError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProviderError::Failed {
                binary: self.binary.clone(),
                status: output.status,
                stderr: stderr_tail(&output.stderr),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TrackProvider for YtDlpProvider {
    fn search(&self, query: &str) -> BoxFuture<'static, ProviderResult<Vec<TrackCandidate>>> {
        let provider = self.clone();
        let target = format!("ytsearch{}:{query}", provider.search_limit);
        Box::pin(async move {
            let args = vec![
                "--dump-json".to_owned(),
                "--flat-playlist".to_owned(),
                "--no-warnings".to_owned(),
                "--quiet".to_owned(),
                target,
            ];
            let stdout = provider.run(args).await?;
            Ok(parse_search_lines(&stdout, provider.search_limit))
        })
    }

    fn download(
        &self,
        track_id: &str,
        dest_dir: PathBuf,
        key: String,
    ) -> BoxFuture<'static, ProviderResult<()>> {
        let provider = self.clone();
        let url = format!("https://www.youtube.com/watch?v={track_id}");
        Box::pin(async move {
            let template = dest_dir.join(format!("{key}.%(ext)s"));
            let args = vec![
                "--format".to_owned(),
                "bestaudio/best".to_owned(),
                "--no-playlist".to_owned(),
                "--no-warnings".to_owned(),
                "--quiet".to_owned(),
                "--extract-audio".to_owned(),
                "--audio-format".to_owned(),
                provider.audio_format.clone(),
                "--audio-quality".to_owned(),
                provider.audio_quality.clone(),
                "--output".to_owned(),
                template.to_string_lossy().into_owned(),
                url,
            ];
            provider.run(args).await?;
            Ok(())
        })
    }
}

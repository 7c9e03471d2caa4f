use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::analyze::{AnalyzerError, AudioAnalyzer};
use super::difficulty::{self, Difficulty};
use super::provider::{ProviderError, ProviderResult, TrackCandidate, TrackProvider};

/// Characters stripped from song names before they become file names.
const FORBIDDEN_KEY_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Prefix of scratch files left behind by interrupted downloads.
const TEMP_PREFIX: &str = "temp_";

/// Suffixes of partial or pre-transcode artifacts worth sweeping up.
const PARTIAL_SUFFIXES: [&str; 2] = [".part", ".webm"];

/// Turn a song name into a filesystem-safe key.
///
/// Forbidden characters become underscores, then surrounding whitespace is
/// trimmed. The result can be empty for names made of whitespace only.
pub fn sanitize_name(name: &str) -> String {
    name.replace(FORBIDDEN_KEY_CHARS, "_").trim().to_owned()
}

/// Errors produced while acquiring a song end to end.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The song name sanitized down to nothing.
    #[error("song name contains no usable characters")]
    EmptyKey,
    /// The track provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Audio analysis failed.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    /// The provider reported success but left no audio file behind.
    #[error("no audio file found for {key} after download")]
    OutputMissing {
        /// Sanitized key the download ran under.
        key: String,
    },
    /// Filesystem housekeeping failed.
    #[error("media directory operation failed")]
    Io(#[from] std::io::Error),
}

/// A fully acquired song: audio on disk plus its measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct SongAsset {
    /// Display name as the player typed it, trimmed.
    pub name: String,
    /// Sanitized key the files are stored under.
    pub key: String,
    /// Path of the playable audio file.
    pub path: PathBuf,
    /// Estimated tempo in beats per minute.
    pub bpm: f32,
    /// Duration in seconds.
    pub duration: f32,
    /// Graded difficulty tier.
    pub difficulty: Difficulty,
}

/// Orchestrates search, download, analysis and grading for songs.
///
/// Concurrent requests for the same song share one in-flight acquisition
/// instead of racing a second download; a failed attempt leaves no cached
/// state, so the next request simply retries.
pub struct AcquisitionPipeline {
    media_dir: PathBuf,
    audio_format: String,
    provider: Box<dyn TrackProvider>,
    analyzer: Box<dyn AudioAnalyzer>,
    in_flight: DashMap<String, Arc<OnceCell<SongAsset>>>,
}

impl AcquisitionPipeline {
    /// Build a pipeline storing audio under `media_dir`.
    pub fn new(
        media_dir: PathBuf,
        audio_format: String,
        provider: Box<dyn TrackProvider>,
        analyzer: Box<dyn AudioAnalyzer>,
    ) -> Self {
        Self {
            media_dir,
            audio_format,
            provider,
            analyzer,
            in_flight: DashMap::new(),
        }
    }

    /// Search the track catalog.
    pub async fn search(&self, query: &str) -> ProviderResult<Vec<TrackCandidate>> {
        self.provider.search(query).await
    }

    /// Acquire a song: ensure its audio is on disk and measured.
    ///
    /// Audio already present is not downloaded again, but it is re-analyzed
    /// so measurements always reflect the file actually on disk.
    pub async fn acquire(&self, name: &str, track_id: &str) -> Result<SongAsset, AcquireError> {
        let display_name = name.trim();
        let key = sanitize_name(name);
        if key.is_empty() {
            return Err(AcquireError::EmptyKey);
        }

        let cell = {
            let entry = self
                .in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()));
            Arc::clone(entry.value())
        };

        let result = cell
            .get_or_try_init(|| self.acquire_uncached(display_name, &key, track_id))
            .await
            .cloned();
        self.in_flight.remove(&key);
        result
    }

    async fn acquire_uncached(
        &self,
        name: &str,
        key: &str,
        track_id: &str,
    ) -> Result<SongAsset, AcquireError> {
        self.purge_scratch().await;

        let target = self.media_dir.join(format!("{key}.{}", self.audio_format));
        if tokio::fs::try_exists(&target).await? {
            debug!(key, "audio already on disk, skipping download");
        } else {
            self.provider
                .download(track_id, self.media_dir.clone(), key.to_owned())
                .await?;
            if !tokio::fs::try_exists(&target).await? {
                self.adopt_provider_output(key, &target).await?;
            }
        }

        let features = self.analyzer.analyze(&target).await?;
        let difficulty = difficulty::classify(features.bpm, features.duration);
        info!(
            key,
            bpm = features.bpm,
            duration = features.duration,
            difficulty = ?difficulty,
            "song ready for play"
        );

        Ok(SongAsset {
            name: name.to_owned(),
            key: key.to_owned(),
            path: target,
            bpm: features.bpm,
            duration: features.duration,
            difficulty,
        })
    }

    /// Sweep leftover download artifacts out of the media directory.
    ///
    /// Best effort only: a failed sweep is logged and never blocks an
    /// acquisition.
    async fn purge_scratch(&self) {
        let mut entries = match tokio::fs::read_dir(&self.media_dir).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!("failed to scan media directory for leftovers: {err}");
                return;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!("failed to read media directory entry: {err}");
                    break;
                }
            };

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let leftover = name.starts_with(TEMP_PREFIX)
                || PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix));
            if !leftover {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => debug!("removed leftover download artifact {name}"),
                Err(err) => warn!("failed to remove leftover {name}: {err}"),
            }
        }
    }

    /// Find whatever file the provider produced for `key` and move it to the
    /// expected target name.
    async fn adopt_provider_output(&self, key: &str, target: &Path) -> Result<(), AcquireError> {
        let prefix = format!("{key}.");
        let mut entries = tokio::fs::read_dir(&self.media_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.starts_with(&prefix) || name.ends_with(".part") {
                continue;
            }

            info!("adopting provider output {name} as {}", target.display());
            tokio::fs::rename(entry.path(), target).await?;
            return Ok(());
        }

        Err(AcquireError::OutputMissing {
            key: key.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future::BoxFuture;
    use tempfile::TempDir;

    use super::*;
    use crate::songs::analyze::{AnalyzerResult, AudioFeatures};

    struct FakeProvider {
        downloads: Arc<AtomicUsize>,
        extension: &'static str,
        write_file: bool,
        delay: Duration,
        fail: Arc<AtomicBool>,
    }

    impl FakeProvider {
        fn writing(extension: &'static str) -> Self {
            Self {
                downloads: Arc::new(AtomicUsize::new(0)),
                extension,
                write_file: true,
                delay: Duration::ZERO,
                fail: Arc::new(AtomicBool::new(false)),
            }
        }

        fn silent() -> Self {
            Self {
                write_file: false,
                ..Self::writing("mp3")
            }
        }
    }

    impl TrackProvider for FakeProvider {
        fn search(&self, _query: &str) -> BoxFuture<'static, ProviderResult<Vec<TrackCandidate>>> {
            Box::pin(async {
                Ok(vec![TrackCandidate {
                    id: "id1".to_owned(),
                    title: "Found".to_owned(),
                }])
            })
        }

        fn download(
            &self,
            _track_id: &str,
            dest_dir: PathBuf,
            key: String,
        ) -> BoxFuture<'static, ProviderResult<()>> {
            let downloads = Arc::clone(&self.downloads);
            let fail = Arc::clone(&self.fail);
            let extension = self.extension;
            let write_file = self.write_file;
            let delay = self.delay;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                downloads.fetch_add(1, Ordering::SeqCst);
                if fail.load(Ordering::SeqCst) {
                    return Err(ProviderError::Launch {
                        binary: "fake".to_owned(),
                        source: std::io::Error::other("download refused"),
                    });
                }
                if write_file {
                    tokio::fs::write(dest_dir.join(format!("{key}.{extension}")), b"audio")
                        .await
                        .unwrap();
                }
                Ok(())
            })
        }
    }

    struct FakeAnalyzer {
        bpm: f32,
        duration: f32,
        calls: Arc<AtomicUsize>,
    }

    impl FakeAnalyzer {
        fn measuring(bpm: f32, duration: f32) -> Self {
            Self {
                bpm,
                duration,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl AudioAnalyzer for FakeAnalyzer {
        fn analyze(&self, _path: &Path) -> BoxFuture<'static, AnalyzerResult<AudioFeatures>> {
            let features = AudioFeatures {
                bpm: self.bpm,
                duration: self.duration,
            };
            let calls = Arc::clone(&self.calls);
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(features)
            })
        }
    }

    fn pipeline_in(
        dir: &TempDir,
        provider: FakeProvider,
        analyzer: FakeAnalyzer,
    ) -> AcquisitionPipeline {
        AcquisitionPipeline::new(
            dir.path().to_path_buf(),
            "mp3".to_owned(),
            Box::new(provider),
            Box::new(analyzer),
        )
    }

    #[test]
    fn sanitize_replaces_forbidden_characters() {
        assert_eq!(sanitize_name("AC/DC: Back?"), "AC_DC_ Back_");
        assert_eq!(sanitize_name("  plain name  "), "plain name");
        assert_eq!(sanitize_name("a<b>c"), "a_b_c");
    }

    #[test]
    fn sanitize_can_empty_out() {
        assert_eq!(sanitize_name("   "), "");
        assert_eq!(sanitize_name(""), "");
    }

    #[tokio::test]
    async fn acquire_downloads_measures_and_grades() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::writing("mp3");
        let downloads = Arc::clone(&provider.downloads);
        let pipeline = pipeline_in(&dir, provider, FakeAnalyzer::measuring(120.0, 200.0));

        let asset = pipeline.acquire("  My Song  ", "vid1").await.unwrap();

        assert_eq!(asset.name, "My Song");
        assert_eq!(asset.key, "My Song");
        assert_eq!(asset.path, dir.path().join("My Song.mp3"));
        assert_eq!(asset.bpm, 120.0);
        assert_eq!(asset.duration, 200.0);
        assert_eq!(asset.difficulty, Difficulty::Medium);
        assert_eq!(downloads.load(Ordering::SeqCst), 1);
        assert!(asset.path.exists());
    }

    #[tokio::test]
    async fn acquire_skips_download_when_audio_exists() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Cached.mp3"), b"audio").unwrap();

        let provider = FakeProvider::writing("mp3");
        let downloads = Arc::clone(&provider.downloads);
        let analyzer = FakeAnalyzer::measuring(90.0, 100.0);
        let analyses = Arc::clone(&analyzer.calls);
        let pipeline = pipeline_in(&dir, provider, analyzer);

        let asset = pipeline.acquire("Cached", "vid1").await.unwrap();

        assert_eq!(downloads.load(Ordering::SeqCst), 0);
        assert_eq!(analyses.load(Ordering::SeqCst), 1);
        assert_eq!(asset.difficulty, Difficulty::Easy);
    }

    #[tokio::test]
    async fn acquire_adopts_output_with_unexpected_extension() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_in(
            &dir,
            FakeProvider::writing("m4a"),
            FakeAnalyzer::measuring(120.0, 200.0),
        );

        let asset = pipeline.acquire("Odd Format", "vid1").await.unwrap();

        assert_eq!(asset.path, dir.path().join("Odd Format.mp3"));
        assert!(asset.path.exists());
        assert!(!dir.path().join("Odd Format.m4a").exists());
    }

    #[tokio::test]
    async fn acquire_reports_missing_provider_output() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_in(
            &dir,
            FakeProvider::silent(),
            FakeAnalyzer::measuring(120.0, 200.0),
        );

        let err = pipeline.acquire("Ghost", "vid1").await.unwrap_err();
        assert!(matches!(err, AcquireError::OutputMissing { key } if key == "Ghost"));
    }

    #[tokio::test]
    async fn acquire_rejects_unusable_names() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_in(
            &dir,
            FakeProvider::writing("mp3"),
            FakeAnalyzer::measuring(120.0, 200.0),
        );

        let err = pipeline.acquire("   ", "vid1").await.unwrap_err();
        assert!(matches!(err, AcquireError::EmptyKey));
    }

    #[tokio::test]
    async fn concurrent_acquires_share_one_download() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider {
            delay: Duration::from_millis(50),
            ..FakeProvider::writing("mp3")
        };
        let downloads = Arc::clone(&provider.downloads);
        let pipeline = pipeline_in(&dir, provider, FakeAnalyzer::measuring(120.0, 200.0));

        let (first, second) =
            tokio::join!(pipeline.acquire("Shared", "vid1"), pipeline.acquire("Shared", "vid1"));

        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(downloads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_acquire_leaves_no_cached_state() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::writing("mp3");
        let fail = Arc::clone(&provider.fail);
        let downloads = Arc::clone(&provider.downloads);
        fail.store(true, Ordering::SeqCst);
        let pipeline = pipeline_in(&dir, provider, FakeAnalyzer::measuring(120.0, 200.0));

        let err = pipeline.acquire("Flaky", "vid1").await.unwrap_err();
        assert!(matches!(err, AcquireError::Provider(_)));

        fail.store(false, Ordering::SeqCst);
        let asset = pipeline.acquire("Flaky", "vid1").await.unwrap();
        assert_eq!(asset.key, "Flaky");
        assert_eq!(downloads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn acquire_purges_leftover_artifacts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("temp_scratch"), b"x").unwrap();
        std::fs::write(dir.path().join("half.part"), b"x").unwrap();
        std::fs::write(dir.path().join("raw.webm"), b"x").unwrap();
        std::fs::write(dir.path().join("keep.mp3"), b"audio").unwrap();

        let pipeline = pipeline_in(
            &dir,
            FakeProvider::writing("mp3"),
            FakeAnalyzer::measuring(120.0, 200.0),
        );
        pipeline.acquire("Fresh", "vid1").await.unwrap();

        assert!(!dir.path().join("temp_scratch").exists());
        assert!(!dir.path().join("half.part").exists());
        assert!(!dir.path().join("raw.webm").exists());
        assert!(dir.path().join("keep.mp3").exists());
    }
}

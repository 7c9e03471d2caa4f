use std::path::Path;

use indexmap::IndexMap;

use crate::{
    dto::debug::{
        ClientLogLevel, ClientLogRequest, DebugInfo, PatternDetail, PatternSummariesResponse,
        PatternSummary,
    },
    error::ServiceError,
    state::SharedState,
    vision::Gesture,
};

use super::health_service;

/// How many beats of a chart the summary view shows.
const SAMPLE_BEATS: usize = 10;

/// Snapshot of server internals for the debug overlay.
pub async fn info(state: &SharedState) -> DebugInfo {
    let health = health_service::health_status(state).await;
    let media_dir = state.config().songs.media_dir.clone();
    let song_files = list_song_files(Path::new(&media_dir), &state.config().songs.audio_format);
    let patterns_file_exists = tokio::fs::try_exists(state.patterns().path())
        .await
        .unwrap_or(false);
    let pattern_keys = state.patterns().all().await.keys().cloned().collect();

    DebugInfo {
        version: env!("CARGO_PKG_VERSION").to_owned(),
        feeds: health.feeds,
        media_dir,
        song_files,
        patterns_file_exists,
        pattern_keys,
    }
}

/// Summarize every stored chart without dumping whole gesture sequences.
pub async fn pattern_summaries(state: &SharedState) -> PatternSummariesResponse {
    let patterns = state
        .patterns()
        .all()
        .await
        .into_iter()
        .map(|(key, pattern)| {
            let summary = PatternSummary {
                length: pattern.len(),
                sample: pattern.iter().copied().take(SAMPLE_BEATS).collect(),
                gestures_used: distinct_gestures(&pattern),
            };
            (key, summary)
        })
        .collect();

    PatternSummariesResponse { patterns }
}

/// Full chart for one song.
pub async fn pattern_detail(
    state: &SharedState,
    song: &str,
) -> Result<PatternDetail, ServiceError> {
    let pattern = state
        .patterns()
        .get(song)
        .await
        .ok_or_else(|| ServiceError::NotFound(format!("no chart stored for '{song}'")))?;

    Ok(PatternDetail {
        song: song.to_owned(),
        length: pattern.len(),
        pattern,
    })
}

/// Write a frontend log line into the server log.
pub fn client_log(request: &ClientLogRequest) {
    let message = request.message.as_str();
    match request.level {
        ClientLogLevel::Debug => tracing::debug!(source = "frontend", message),
        ClientLogLevel::Info => tracing::info!(source = "frontend", message),
        ClientLogLevel::Warn => tracing::warn!(source = "frontend", message),
        ClientLogLevel::Error => tracing::error!(source = "frontend", message),
    }
}

fn distinct_gestures(pattern: &[Gesture]) -> Vec<Gesture> {
    let mut seen = Vec::new();
    for gesture in pattern {
        if !seen.contains(gesture) {
            seen.push(*gesture);
        }
    }
    seen
}

fn list_song_files(media_dir: &Path, audio_format: &str) -> Vec<String> {
    let entries = match std::fs::read_dir(media_dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %media_dir.display(), error = %err, "failed to list media directory");
            return Vec::new();
        }
    };

    let suffix = format!(".{audio_format}");
    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(&suffix))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_gestures_preserves_first_seen_order() {
        let pattern = [
            Gesture::Fist,
            Gesture::Peace,
            Gesture::Fist,
            Gesture::OpenHand,
            Gesture::Peace,
        ];

        assert_eq!(
            distinct_gestures(&pattern),
            vec![Gesture::Fist, Gesture::Peace, Gesture::OpenHand]
        );
    }

    #[test]
    fn list_song_files_filters_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("beta.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("gamma.webm"), b"x").unwrap();

        let files = list_song_files(dir.path(), "mp3");

        assert_eq!(files, vec!["alpha.mp3".to_owned(), "beta.mp3".to_owned()]);
    }

    #[test]
    fn list_song_files_handles_missing_directory() {
        let files = list_song_files(Path::new("/definitely/not/here"), "mp3");

        assert!(files.is_empty());
    }
}

use std::cmp::Reverse;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use super::json_file::{self, StoreResult};

/// Number of entries the leaderboard keeps.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// One finished game on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreEntry {
    /// Player name as submitted.
    pub player: String,
    /// Final score.
    pub score: i64,
    /// Song the score was achieved on.
    pub song: String,
    /// Unix timestamp of submission.
    pub timestamp: i64,
}

impl ScoreEntry {
    /// Build an entry timestamped now.
    pub fn now(player: String, score: i64, song: String) -> Self {
        Self {
            player,
            score,
            song,
            timestamp: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}

/// JSON-file store of the top scores, best first.
pub struct LeaderboardStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LeaderboardStore {
    /// Build a store over the given JSON file.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the leaderboard, best score first.
    pub async fn top(&self) -> Vec<ScoreEntry> {
        json_file::load_or_default(&self.path).await
    }

    /// Record a score and return the updated leaderboard.
    ///
    /// The sort is stable, so among equal scores the earlier submission
    /// keeps the higher rank. Anything past the capacity falls off.
    pub async fn record(&self, entry: ScoreEntry) -> StoreResult<Vec<ScoreEntry>> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.top().await;
        entries.push(entry);
        entries.sort_by_key(|entry| Reverse(entry.score));
        entries.truncate(LEADERBOARD_CAPACITY);

        json_file::persist(&self.path, &entries).await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> LeaderboardStore {
        LeaderboardStore::new(dir.path().join("leaderboard.json"))
    }

    fn entry(player: &str, score: i64) -> ScoreEntry {
        ScoreEntry {
            player: player.to_owned(),
            score,
            song: "song".to_owned(),
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).top().await.is_empty());
    }

    #[tokio::test]
    async fn scores_rank_best_first() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.record(entry("low", 100)).await.unwrap();
        store.record(entry("high", 900)).await.unwrap();
        let board = store.record(entry("mid", 500)).await.unwrap();

        let players: Vec<&str> = board.iter().map(|e| e.player.as_str()).collect();
        assert_eq!(players, vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn capacity_evicts_the_lowest_score() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for score in 1..=11 {
            store.record(entry(&format!("p{score}"), score)).await.unwrap();
        }

        let board = store.top().await;
        assert_eq!(board.len(), LEADERBOARD_CAPACITY);
        assert_eq!(board[0].score, 11);
        assert_eq!(board.last().unwrap().score, 2);
    }

    #[tokio::test]
    async fn equal_scores_keep_submission_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.record(entry("first", 500)).await.unwrap();
        let board = store.record(entry("second", 500)).await.unwrap();

        assert_eq!(board[0].player, "first");
        assert_eq!(board[1].player, "second");
    }

    #[tokio::test]
    async fn corrupt_file_recovers_on_next_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leaderboard.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = store_in(&dir);
        assert!(store.top().await.is_empty());

        let board = store.record(entry("only", 42)).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(store.top().await, board);
    }
}

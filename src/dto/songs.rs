use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::validate_song_name;
use crate::songs::acquire::SongAsset;
use crate::songs::difficulty::Difficulty;
use crate::songs::provider::TrackCandidate;

/// Free-text catalog search.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SearchRequest {
    /// What to search the track catalog for.
    #[validate(length(min = 1, message = "Search query must not be empty"))]
    pub query: String,
}

/// One track offered by the catalog.
#[derive(Debug, Serialize, ToSchema)]
pub struct CandidateDto {
    /// Human-readable title.
    pub title: String,
    /// Identifier to pass back when selecting the track.
    pub id: String,
}

impl From<TrackCandidate> for CandidateDto {
    fn from(candidate: TrackCandidate) -> Self {
        Self {
            title: candidate.title,
            id: candidate.id,
        }
    }
}

/// Search results in catalog order.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// Matching tracks, best match first.
    pub results: Vec<CandidateDto>,
}

/// Selection of a track to play, naming the song it becomes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectSongRequest {
    /// Catalog identifier from a previous search.
    pub video_id: String,
    /// Name the song will be stored and displayed under.
    pub song_name: String,
}

impl Validate for SelectSongRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.video_id.is_empty() {
            let mut err = validator::ValidationError::new("video_id_empty");
            err.message = Some("Video id must not be empty".into());
            errors.add("video_id", err);
        }

        if let Err(e) = validate_song_name(&self.song_name) {
            errors.add("song_name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A song readied for play, with everything the game needs to run it.
#[derive(Debug, Serialize, ToSchema)]
pub struct SongAssetDto {
    /// Display name of the song.
    pub song_name: String,
    /// URL path the audio is served from.
    pub file: String,
    /// Estimated tempo in beats per minute.
    pub bpm: f32,
    /// Duration in seconds.
    pub duration: f32,
    /// Graded difficulty tier.
    pub difficulty: Difficulty,
    /// Beat-density multiplier of the tier.
    pub multiplier: f32,
}

impl From<&SongAsset> for SongAssetDto {
    fn from(asset: &SongAsset) -> Self {
        let file_name = asset
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| asset.key.clone());
        Self {
            song_name: asset.name.clone(),
            file: format!("/songs/{file_name}"),
            bpm: asset.bpm,
            duration: asset.duration,
            difficulty: asset.difficulty,
            multiplier: asset.difficulty.multiplier(),
        }
    }
}

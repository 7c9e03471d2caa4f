use tracing::{debug, info, warn};

use crate::dto::songs::{SearchRequest, SearchResponse, SelectSongRequest, SongAssetDto};
use crate::error::ServiceError;
use crate::songs::pattern;
use crate::state::SharedState;

/// Search the track catalog.
///
/// Search is best effort: a provider failure degrades to an empty result
/// list instead of an error, so the picker keeps working while the provider
/// is flaky.
pub async fn search(state: &SharedState, request: SearchRequest) -> SearchResponse {
    let results = match state.pipeline().search(&request.query).await {
        Ok(candidates) => candidates.into_iter().map(Into::into).collect(),
        Err(err) => {
            warn!(query = %request.query, "track search failed: {err}");
            Vec::new()
        }
    };
    SearchResponse { results }
}

/// Acquire the selected song and make sure it has a chart.
///
/// The chart is generated deterministically from the song key and stored
/// only if the song has none yet; replays keep their original chart. A
/// chart that fails to persist is logged but does not fail the selection,
/// the song is already playable.
pub async fn select(
    state: &SharedState,
    request: SelectSongRequest,
) -> Result<SongAssetDto, ServiceError> {
    let asset = state
        .pipeline()
        .acquire(&request.song_name, &request.video_id)
        .await?;

    let chart = pattern::generate(
        &asset.key,
        asset.bpm,
        asset.duration,
        asset.difficulty.multiplier(),
    );
    match state.patterns().ensure(&asset.key, chart).await {
        Ok(true) => info!(key = %asset.key, "stored new gesture chart"),
        Ok(false) => debug!(key = %asset.key, "gesture chart already stored"),
        Err(err) => warn!(key = %asset.key, "failed to persist gesture chart: {err}"),
    }

    Ok(SongAssetDto::from(&asset))
}

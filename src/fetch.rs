use crate::api::{SearchApi, PAGE_SIZE};
use crate::error::ApiError;
use crate::models::{ChannelStat, HasId, VideoDetail};
use crate::rotation::KeyRotator;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};

/// Batched id lookup with key rotation.
///
/// Ids are split into chunks of at most [`PAGE_SIZE`]. Each chunk is
/// retried with the next key on quota failures, at most once per key; a
/// chunk that never succeeds contributes nothing. Upstream failures drop
/// the chunk immediately. The returned map is therefore best-effort:
/// absence of an id means "could not be fetched", never an error.
pub async fn fetch_batch<T, F, Fut>(
    rotator: &mut KeyRotator,
    ids: &[String],
    mut call: F,
) -> HashMap<String, T>
where
    T: HasId,
    F: FnMut(String, Vec<String>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
{
    let mut results: HashMap<String, T> = HashMap::new();
    if ids.is_empty() {
        return results;
    }
    if rotator.is_empty() {
        warn!("batch fetch skipped: no API keys");
        return results;
    }

    for chunk in ids.chunks(PAGE_SIZE) {
        let max_attempts = rotator.len();
        let mut attempts = 0;

        loop {
            let key = match rotator.current() {
                Ok(k) => k.to_string(),
                Err(_) => return results,
            };

            match call(key, chunk.to_vec()).await {
                Ok(items) => {
                    for item in items {
                        results.insert(item.id().to_string(), item);
                    }
                    break;
                }
                Err(err) if err.is_quota() => {
                    rotator.advance();
                    attempts += 1;
                    if attempts >= max_attempts {
                        warn!(
                            "dropping chunk of {} ids: every key rejected it ({})",
                            chunk.len(),
                            err
                        );
                        break;
                    }
                }
                Err(err) => {
                    warn!("dropping chunk of {} ids: {}", chunk.len(), err);
                    break;
                }
            }
        }
    }

    debug!("batch fetch resolved {}/{} ids", results.len(), ids.len());
    results
}

/// Fetch full video details for a set of ids, keyed by video id.
pub async fn fetch_video_details(
    api: &dyn SearchApi,
    rotator: &mut KeyRotator,
    ids: &[String],
) -> HashMap<String, VideoDetail> {
    fetch_batch(rotator, ids, |key, chunk| async move {
        api.list_videos(&key, &chunk).await
    })
    .await
}

/// Fetch channel statistics for a set of channel ids, keyed by channel id.
pub async fn fetch_channel_stats(
    api: &dyn SearchApi,
    rotator: &mut KeyRotator,
    ids: &[String],
) -> HashMap<String, ChannelStat> {
    fetch_batch(rotator, ids, |key, chunk| async move {
        api.list_channels(&key, &chunk).await
    })
    .await
}

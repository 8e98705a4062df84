use crate::api::{SearchApi, SearchPageRequest};
use crate::error::{ApiError, HarvestError};
use crate::models::SearchResultItem;
use crate::rotation::KeyRotator;
use tracing::{debug, info, warn};

/// Substituted for an empty query so popular videos still surface.
const WILDCARD_QUERY: &str = "*";

/// Parameters for one harvest pass.
#[derive(Debug, Clone)]
pub struct HarvestParams {
    pub query: String,
    pub target_count: usize,
    /// RFC3339 lower bound on publication time.
    pub published_after: String,
}

/// Progress callback invoked between network round-trips with
/// `(collected_so_far, target_count)`.
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize);

/// Drive the search capability page by page until the target item count is
/// reached or the capability reports no more pages.
///
/// Quota-class failures rotate to the next key and retry the same page.
/// A full rotation cycle with zero successful pages escalates to
/// [`HarvestError::KeysExhausted`]; a full cycle after some progress keeps
/// the partial result instead, as does any non-quota failure. Results stay
/// in upstream order (view count descending) and may overshoot the target
/// by up to one page.
pub async fn harvest(
    api: &dyn SearchApi,
    rotator: &mut KeyRotator,
    params: &HarvestParams,
    mut progress: Option<ProgressFn<'_>>,
) -> Result<(Vec<SearchResultItem>, usize), HarvestError> {
    if rotator.is_empty() {
        return Err(HarvestError::EmptyKeySet);
    }

    let query = if params.query.trim().is_empty() {
        WILDCARD_QUERY.to_string()
    } else {
        params.query.trim().to_string()
    };

    let mut collected: Vec<SearchResultItem> = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages_succeeded = 0usize;
    let mut failures_since_success = 0usize;

    info!(
        "harvesting up to {} items for query {:?} since {}",
        params.target_count, query, params.published_after
    );

    while collected.len() < params.target_count {
        let key = rotator.current()?.to_string();
        let request = SearchPageRequest {
            query: query.clone(),
            published_after: params.published_after.clone(),
            page_token: page_token.clone(),
        };

        match api.search_page(&key, &request).await {
            Ok(page) => {
                pages_succeeded += 1;
                failures_since_success = 0;

                if page.items.is_empty() {
                    debug!("empty page after {} items, stopping", collected.len());
                    break;
                }
                collected.extend(page.items);
                if let Some(cb) = progress.as_mut() {
                    cb(collected.len(), params.target_count);
                }

                page_token = page.next_page_token;
                if page_token.is_none() {
                    debug!("no continuation token after {} items", collected.len());
                    break;
                }
            }
            Err(err @ ApiError::QuotaExceeded { .. }) => {
                rotator.advance();
                failures_since_success += 1;
                debug!("rotated key after {}; retrying same page", err);

                // A full cycle of rotations without a single page landed:
                // either nothing at all was fetched (exhaustion, distinct
                // from "no results") or we keep what we have.
                if failures_since_success >= rotator.len() {
                    if pages_succeeded == 0 {
                        warn!("every API key rejected the first page");
                        return Err(HarvestError::KeysExhausted {
                            key_count: rotator.len(),
                        });
                    }
                    warn!(
                        "keys exhausted mid-harvest, keeping {} items",
                        collected.len()
                    );
                    break;
                }
            }
            Err(ApiError::Upstream { message }) => {
                warn!("search page failed ({}), keeping {} items", message, collected.len());
                break;
            }
        }
    }

    let total = collected.len();
    info!("harvest finished with {} items over {} pages", total, pages_succeeded);
    Ok((collected, total))
}

use crate::duration::parse_duration;
use crate::error::ApiError;
use crate::models::{ChannelStat, SearchResultItem, VideoDetail};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Page size for search and the hard cap on batched id lookups.
pub const PAGE_SIZE: usize = 50;

/// One page worth of search parameters.
#[derive(Debug, Clone)]
pub struct SearchPageRequest {
    pub query: String,
    pub published_after: String,
    pub page_token: Option<String>,
}

/// One page of search results plus the continuation token, if any.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub items: Vec<SearchResultItem>,
    pub next_page_token: Option<String>,
}

/// The external search/detail/channel capability. Implemented over the
/// YouTube Data API v3 in production and by mocks in tests; the harvester
/// and batch fetcher only see this seam.
///
/// Every method takes the API key explicitly: key selection belongs to the
/// rotation loop, not to the client.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Fetch one search page, ordered by view count descending.
    async fn search_page(
        &self,
        api_key: &str,
        request: &SearchPageRequest,
    ) -> Result<SearchPage, ApiError>;

    /// Fetch full details for up to [`PAGE_SIZE`] video ids.
    async fn list_videos(&self, api_key: &str, ids: &[String]) -> Result<Vec<VideoDetail>, ApiError>;

    /// Fetch statistics for up to [`PAGE_SIZE`] channel ids.
    async fn list_channels(
        &self,
        api_key: &str,
        ids: &[String],
    ) -> Result<Vec<ChannelStat>, ApiError>;
}

/// YouTube Data API v3 client.
#[derive(Clone)]
pub struct YouTubeClient {
    client: reqwest::Client,
}

impl YouTubeClient {
    pub fn new(timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", API_BASE, endpoint);
        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = parse_error_reason(&body).unwrap_or_default();
            warn!(
                "YouTube {} failed (HTTP {}{})",
                endpoint,
                status.as_u16(),
                if reason.is_empty() {
                    String::new()
                } else {
                    format!(", reason={}", reason)
                }
            );
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        response.json::<T>().await.map_err(|e| ApiError::Upstream {
            message: format!("failed to decode {} response: {}", endpoint, e),
        })
    }
}

#[async_trait]
impl SearchApi for YouTubeClient {
    async fn search_page(
        &self,
        api_key: &str,
        request: &SearchPageRequest,
    ) -> Result<SearchPage, ApiError> {
        let page_size = PAGE_SIZE.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("q", request.query.as_str()),
            ("order", "viewCount"),
            ("publishedAfter", request.published_after.as_str()),
            ("type", "video"),
            ("maxResults", page_size.as_str()),
            ("key", api_key),
        ];
        if let Some(token) = &request.page_token {
            params.push(("pageToken", token.as_str()));
        }

        debug!("search page q={:?} token={:?}", request.query, request.page_token);
        let response: WireSearchResponse = self.get_json("search", &params).await?;

        let items = response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(SearchResultItem {
                    video_id,
                    channel_id: item.snippet.channel_id,
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                })
            })
            .collect();

        Ok(SearchPage {
            items,
            next_page_token: response.next_page_token,
        })
    }

    async fn list_videos(&self, api_key: &str, ids: &[String]) -> Result<Vec<VideoDetail>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let params = [
            ("part", "snippet,statistics,contentDetails"),
            ("id", joined.as_str()),
            ("key", api_key),
        ];

        let response: WireVideosResponse = self.get_json("videos", &params).await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| VideoDetail {
                video_id: item.id,
                channel_id: item.snippet.channel_id,
                title: item.snippet.title,
                description: item.snippet.description.unwrap_or_default(),
                duration_seconds: parse_duration(&item.content_details.duration),
                view_count: parse_count(&item.statistics.view_count),
                like_count: parse_count(&item.statistics.like_count),
                comment_count: parse_count(&item.statistics.comment_count),
                tags: item.snippet.tags.unwrap_or_default(),
                thumbnail_url: item
                    .snippet
                    .thumbnails
                    .and_then(|t| t.high.or(t.default))
                    .map(|t| t.url),
            })
            .collect())
    }

    async fn list_channels(
        &self,
        api_key: &str,
        ids: &[String],
    ) -> Result<Vec<ChannelStat>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let params = [
            ("part", "statistics"),
            ("id", joined.as_str()),
            ("key", api_key),
        ];

        let response: WireChannelsResponse = self.get_json("channels", &params).await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| {
                // Hidden subscriber counts are treated as zero.
                let subscriber_count = if item.statistics.hidden_subscriber_count {
                    0
                } else {
                    parse_count(&item.statistics.subscriber_count)
                };
                ChannelStat {
                    channel_id: item.id,
                    subscriber_count,
                    total_views: parse_count(&item.statistics.view_count),
                    video_count: parse_count(&item.statistics.video_count),
                }
            })
            .collect())
    }
}

/// The API reports numeric counters as JSON strings.
fn parse_count(raw: &Option<String>) -> u64 {
    raw.as_deref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0)
}

fn parse_error_reason(body: &str) -> Option<String> {
    let parsed: WireErrorEnvelope = serde_json::from_str(body).ok()?;
    parsed.error.errors.into_iter().next()?.reason
}

// --- Wire formats ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSearchResponse {
    #[serde(default)]
    items: Vec<WireSearchItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSearchItem {
    id: WireSearchItemId,
    snippet: WireSearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSearchSnippet {
    channel_id: String,
    title: String,
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct WireVideosResponse {
    #[serde(default)]
    items: Vec<WireVideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVideoItem {
    id: String,
    snippet: WireVideoSnippet,
    statistics: WireVideoStatistics,
    content_details: WireContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVideoSnippet {
    channel_id: String,
    title: String,
    description: Option<String>,
    tags: Option<Vec<String>>,
    thumbnails: Option<WireThumbnails>,
}

#[derive(Debug, Deserialize)]
struct WireThumbnails {
    high: Option<WireThumbnail>,
    default: Option<WireThumbnail>,
}

#[derive(Debug, Deserialize)]
struct WireThumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
struct WireChannelsResponse {
    #[serde(default)]
    items: Vec<WireChannelItem>,
}

#[derive(Debug, Deserialize)]
struct WireChannelItem {
    id: String,
    statistics: WireChannelStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireChannelStatistics {
    subscriber_count: Option<String>,
    #[serde(default)]
    hidden_subscriber_count: bool,
    view_count: Option<String>,
    video_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireErrorEnvelope {
    error: WireErrorBody,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    #[serde(default)]
    errors: Vec<WireErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    reason: Option<String>,
}

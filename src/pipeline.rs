use crate::api::SearchApi;
use crate::duration::format_duration;
use crate::error::HarvestError;
use crate::fetch::{fetch_channel_stats, fetch_video_details};
use crate::filter::{filter_items, FilterParams};
use crate::harvest::{harvest, HarvestParams, ProgressFn};
use crate::models::{RankedVideo, ResearchReport, VideoDetail};
use crate::rotation::KeyRotator;
use chrono::{Duration, SecondsFormat, Utc};
use std::collections::HashSet;
use tracing::info;

/// Parameters for one research pass: what to search for, how much to
/// scan, and the filter thresholds.
#[derive(Debug, Clone)]
pub struct ResearchParams {
    pub query: String,
    pub target_count: usize,
    pub days_back: i64,
    pub filter: FilterParams,
}

/// The caller-facing result of a research pass: accepted videos in
/// upstream rank order, the raw scan count, and the diagnostic counters
/// explaining what each filter stage eliminated.
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    pub videos: Vec<RankedVideo>,
    pub total_scanned: usize,
    pub report: ResearchReport,
}

impl ResearchOutcome {
    /// The accepted details, for feeding into keyword aggregation.
    pub fn details(&self) -> Vec<VideoDetail> {
        self.videos.iter().map(|v| v.detail.clone()).collect()
    }
}

/// RFC3339 lower publication bound for a days-back window.
pub fn published_after(days_back: i64) -> String {
    (Utc::now() - Duration::days(days_back)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Full research pass: harvest search pages, batch-fetch video details and
/// channel statistics, then filter.
///
/// The three phases share one rotator sequentially; the key the harvest
/// ends on is the key the batch phases start with. Batch-level failures
/// degrade to partial results, so a video whose details could not be
/// fetched simply drops out. Only credential exhaustion with zero progress
/// is an error; an empty result set is a normal outcome with counters
/// explaining it.
pub async fn run_research(
    api: &dyn SearchApi,
    rotator: &mut KeyRotator,
    params: &ResearchParams,
    progress: Option<ProgressFn<'_>>,
) -> Result<ResearchOutcome, HarvestError> {
    let harvest_params = HarvestParams {
        query: params.query.clone(),
        target_count: params.target_count,
        published_after: published_after(params.days_back),
    };

    let (items, total_scanned) = harvest(api, rotator, &harvest_params, progress).await?;

    let mut report = ResearchReport {
        total_found: total_scanned as u64,
        ..Default::default()
    };

    if items.is_empty() {
        report.active_key_line = rotator.cursor() + 1;
        return Ok(ResearchOutcome {
            videos: Vec::new(),
            total_scanned,
            report,
        });
    }

    let video_ids: Vec<String> = items.iter().map(|i| i.video_id.clone()).collect();
    let mut details_map = fetch_video_details(api, rotator, &video_ids).await;

    // Re-assemble in upstream rank order; unfetched ids drop out.
    let details: Vec<VideoDetail> = video_ids
        .iter()
        .filter_map(|id| details_map.remove(id))
        .collect();

    let channel_ids: Vec<String> = details
        .iter()
        .map(|d| d.channel_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let channels = fetch_channel_stats(api, rotator, &channel_ids).await;

    let (accepted, counts) = filter_items(details, &channels, &params.filter);

    report.filter = counts;
    report.videos_processed = accepted.len() as u64;
    report.unique_channels = accepted
        .iter()
        .map(|d| d.channel_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;
    report.total_views_reached = accepted.iter().map(|d| d.view_count).sum();
    report.active_key_line = rotator.cursor() + 1;

    let videos: Vec<RankedVideo> = accepted
        .into_iter()
        .map(|detail| {
            let subscriber_count = channels
                .get(&detail.channel_id)
                .map(|c| c.subscriber_count)
                .unwrap_or(0);
            RankedVideo {
                subscriber_count,
                duration_text: format_duration(detail.duration_seconds),
                engagement_rate: detail.engagement_rate(),
                url: detail.watch_url(),
                detail,
            }
        })
        .collect();

    info!(
        "research pass done: {} accepted of {} scanned ({} channels)",
        videos.len(),
        total_scanned,
        report.unique_channels
    );

    Ok(ResearchOutcome {
        videos,
        total_scanned,
        report,
    })
}

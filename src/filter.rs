use crate::models::{ChannelStat, FilterCounts, VideoDetail};
use std::collections::HashMap;
use tracing::info;

/// Thresholds applied by the filter pipeline. `max_subscribers == 0`
/// disables the subscriber stage; `max_duration == u64::MAX` means no
/// upper bound.
#[derive(Debug, Clone, Copy)]
pub struct FilterParams {
    pub min_duration: u64,
    pub max_duration: u64,
    pub min_views: u64,
    pub max_subscribers: u64,
}

/// Apply the duration, view and subscriber predicates in fixed order,
/// counting what each stage eliminates.
///
/// Items blocked only by the subscriber cap go to a rescue pool; if
/// nothing at all survives but the pool is non-empty, the pool becomes the
/// result and `auto_rescued` is set. The harder duration/view filters are
/// never rescued, so a softer subscriber threshold can rescue a search
/// from zero results without loosening anything else.
pub fn filter_items(
    details: Vec<VideoDetail>,
    channels: &HashMap<String, ChannelStat>,
    params: &FilterParams,
) -> (Vec<VideoDetail>, FilterCounts) {
    let mut counts = FilterCounts::default();
    let mut accepted: Vec<VideoDetail> = Vec::new();
    let mut rescued: Vec<VideoDetail> = Vec::new();

    for detail in details {
        if detail.duration_seconds < params.min_duration
            || detail.duration_seconds > params.max_duration
        {
            counts.blocked_duration += 1;
            continue;
        }
        if detail.view_count < params.min_views {
            counts.blocked_views += 1;
            continue;
        }
        if params.max_subscribers > 0 {
            // Unresolved channels count as zero subscribers.
            let subs = channels
                .get(&detail.channel_id)
                .map(|c| c.subscriber_count)
                .unwrap_or(0);
            if subs > params.max_subscribers {
                counts.blocked_subs += 1;
                rescued.push(detail);
                continue;
            }
        }
        counts.passed += 1;
        accepted.push(detail);
    }

    if accepted.is_empty() && !rescued.is_empty() {
        info!(
            "subscriber filter eliminated everything, rescuing {} items",
            rescued.len()
        );
        counts.auto_rescued = true;
        counts.passed = rescued.len() as u64;
        accepted = rescued;
    }

    (accepted, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: &str, channel: &str, duration: u64, views: u64) -> VideoDetail {
        VideoDetail {
            video_id: id.to_string(),
            channel_id: channel.to_string(),
            title: format!("video {}", id),
            description: String::new(),
            duration_seconds: duration,
            view_count: views,
            like_count: 0,
            comment_count: 0,
            tags: Vec::new(),
            thumbnail_url: None,
        }
    }

    fn channel(id: &str, subs: u64) -> (String, ChannelStat) {
        (
            id.to_string(),
            ChannelStat {
                channel_id: id.to_string(),
                subscriber_count: subs,
                total_views: 0,
                video_count: 0,
            },
        )
    }

    fn params() -> FilterParams {
        FilterParams {
            min_duration: 60,
            max_duration: 3600,
            min_views: 1000,
            max_subscribers: 10_000,
        }
    }

    #[test]
    fn test_stage_order_and_counters() {
        let channels: HashMap<_, _> = [channel("big", 1_000_000), channel("small", 500)].into();
        let details = vec![
            detail("a", "small", 30, 5000),   // too short
            detail("b", "small", 5000, 5000), // too long
            detail("c", "small", 120, 10),    // too few views
            detail("d", "big", 120, 5000),    // channel too big
            detail("e", "small", 120, 5000),  // passes
        ];

        let (accepted, counts) = filter_items(details, &channels, &params());
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].video_id, "e");
        assert_eq!(counts.blocked_duration, 2);
        assert_eq!(counts.blocked_views, 1);
        assert_eq!(counts.blocked_subs, 1);
        assert_eq!(counts.passed, 1);
        assert!(!counts.auto_rescued);
    }

    #[test]
    fn test_auto_rescue_when_subs_filter_blocks_all() {
        let channels: HashMap<_, _> = [channel("big", 1_000_000)].into();
        let details: Vec<_> = (0..5)
            .map(|i| detail(&format!("v{}", i), "big", 120, 5000))
            .collect();

        let (accepted, counts) = filter_items(details, &channels, &params());
        assert_eq!(accepted.len(), 5);
        assert!(counts.auto_rescued);
        assert_eq!(counts.blocked_subs, 5);
        assert_eq!(counts.passed, 5);
    }

    #[test]
    fn test_rescue_never_applies_to_duration_or_views() {
        let channels = HashMap::new();
        let details = vec![detail("a", "c1", 10, 5000), detail("b", "c1", 120, 1)];

        let (accepted, counts) = filter_items(details, &channels, &params());
        assert!(accepted.is_empty());
        assert!(!counts.auto_rescued);
        assert_eq!(counts.blocked_duration, 1);
        assert_eq!(counts.blocked_views, 1);
    }

    #[test]
    fn test_subscriber_filter_disabled_at_zero() {
        let channels: HashMap<_, _> = [channel("big", 1_000_000)].into();
        let mut p = params();
        p.max_subscribers = 0;

        let (accepted, counts) = filter_items(vec![detail("a", "big", 120, 5000)], &channels, &p);
        assert_eq!(accepted.len(), 1);
        assert_eq!(counts.blocked_subs, 0);
    }

    #[test]
    fn test_unknown_channel_counts_as_zero_subs() {
        let channels = HashMap::new();
        let (accepted, _) = filter_items(vec![detail("a", "ghost", 120, 5000)], &channels, &params());
        assert_eq!(accepted.len(), 1);
    }
}

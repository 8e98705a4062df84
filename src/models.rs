use serde::{Deserialize, Serialize};

/// One hit from a search page: the slim shape the search capability
/// returns before details are fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub video_id: String,
    pub channel_id: String,
    pub title: String,
    pub published_at: String,
}

/// Full per-video metadata from the batch detail capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDetail {
    pub video_id: String,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub duration_seconds: u64,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
}

impl VideoDetail {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// `(likes + comments) / views * 100`, zero when there are no views.
    pub fn engagement_rate(&self) -> f64 {
        if self.view_count == 0 {
            return 0.0;
        }
        (self.like_count + self.comment_count) as f64 / self.view_count as f64 * 100.0
    }
}

/// Per-channel statistics. A hidden subscriber count is stored as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStat {
    pub channel_id: String,
    pub subscriber_count: u64,
    pub total_views: u64,
    pub video_count: u64,
}

/// Identity accessor used by the batch fetcher to merge results by id.
pub trait HasId {
    fn id(&self) -> &str;
}

impl HasId for VideoDetail {
    fn id(&self) -> &str {
        &self.video_id
    }
}

impl HasId for ChannelStat {
    fn id(&self) -> &str {
        &self.channel_id
    }
}

/// Word-count class of a keyword candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordClass {
    Single,
    Pair,
    Phrase,
}

impl WordClass {
    pub fn of(word_count: usize) -> Self {
        match word_count {
            0 | 1 => WordClass::Single,
            2 => WordClass::Pair,
            _ => WordClass::Phrase,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WordClass::Single => "1 word",
            WordClass::Pair => "2 words",
            WordClass::Phrase => "3+ words",
        }
    }
}

/// Accumulated statistics for one normalized keyword, plus the composite
/// viral score once scoring has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub keyword: String,
    pub word_class: WordClass,
    pub occurrences: u64,
    pub total_views: u64,
    pub total_likes: u64,
    pub avg_views: u64,
    pub engagement_score: f64,
    pub viral_score: f64,
}

/// Per-stage elimination counters from the filter pipeline.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FilterCounts {
    pub blocked_duration: u64,
    pub blocked_views: u64,
    pub blocked_subs: u64,
    pub passed: u64,
    pub auto_rescued: bool,
}

/// Diagnostic counters for a full research pass, explaining where
/// candidates were eliminated and what survived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchReport {
    pub total_found: u64,
    pub filter: FilterCounts,
    pub unique_channels: u64,
    pub videos_processed: u64,
    pub total_views_reached: u64,
    /// 1-based ordinal of the key active when the pass finished.
    pub active_key_line: usize,
}

/// An accepted video joined with its channel's subscriber count, ready for
/// presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedVideo {
    pub detail: VideoDetail,
    pub subscriber_count: u64,
    pub duration_text: String,
    pub engagement_rate: f64,
    pub url: String,
}

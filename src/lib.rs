/// yt-intel
///
/// Quota-rotating harvester for YouTube video metadata with multi-stage
/// filtering and viral-keyword scoring. The network layer rotates across
/// multiple API keys on quota failures and degrades to partial results
/// instead of failing whole runs.

pub mod api;
pub mod config;
pub mod duration;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod harvest;
pub mod history;
pub mod keywords;
pub mod models;
pub mod pipeline;
pub mod rotation;

// Re-export main types for easy access
pub use crate::api::{SearchApi, SearchPage, SearchPageRequest, YouTubeClient, PAGE_SIZE};
pub use crate::config::{Config, ScanMode};
pub use crate::duration::{format_duration, parse_duration};
pub use crate::error::{ApiError, HarvestError};
pub use crate::fetch::{fetch_batch, fetch_channel_stats, fetch_video_details};
pub use crate::filter::{filter_items, FilterParams};
pub use crate::harvest::{harvest, HarvestParams};
pub use crate::history::HistoryStore;
pub use crate::keywords::aggregate;
pub use crate::models::{
    ChannelStat, FilterCounts, KeywordRecord, RankedVideo, ResearchReport, SearchResultItem,
    VideoDetail, WordClass,
};
pub use crate::pipeline::{run_research, ResearchOutcome, ResearchParams};
pub use crate::rotation::KeyRotator;

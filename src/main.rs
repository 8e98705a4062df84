use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use tracing::{info, warn};

use yt_intel::config::{Config, ScanMode};
use yt_intel::filter::FilterParams;
use yt_intel::history::HistoryStore;
use yt_intel::keywords;
use yt_intel::models::WordClass;
use yt_intel::pipeline::{run_research, ResearchParams};
use yt_intel::rotation::KeyRotator;
use yt_intel::YouTubeClient;

fn shared_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("query")
            .value_name("QUERY")
            .help("Search query; empty searches for popular videos")
            .default_value(""),
    )
    .arg(
        Arg::new("mode")
            .short('m')
            .long("mode")
            .value_name("MODE")
            .help("Scan mode: light, standard, aggressive, max"),
    )
    .arg(
        Arg::new("days-back")
            .long("days-back")
            .value_name("DAYS")
            .help("Only consider videos published within this many days"),
    )
    .arg(
        Arg::new("min-views")
            .long("min-views")
            .value_name("NUM")
            .help("Minimum view count"),
    )
    .arg(
        Arg::new("max-subs")
            .long("max-subs")
            .value_name("NUM")
            .help("Maximum channel subscribers (0 disables the filter)"),
    )
    .arg(
        Arg::new("min-duration")
            .long("min-duration")
            .value_name("SECONDS")
            .help("Minimum video duration in seconds"),
    )
    .arg(
        Arg::new("max-duration")
            .long("max-duration")
            .value_name("SECONDS")
            .help("Maximum video duration in seconds"),
    )
    .arg(
        Arg::new("limit")
            .long("limit")
            .value_name("NUM")
            .help("Override the scan mode's target item count"),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("yt_intel=info,warn")),
        )
        .init();

    let matches = Command::new("yt-intel")
        .version("0.1.0")
        .about("Quota-rotating YouTube metadata harvester and viral keyword scorer")
        .subcommand_required(true)
        .subcommand(shared_args(
            Command::new("research").about("Find recent videos passing the filters"),
        ))
        .subcommand(
            shared_args(Command::new("keywords").about("Aggregate and score viral keywords"))
                .arg(
                    Arg::new("word-classes")
                        .long("word-classes")
                        .value_name("CLASSES")
                        .help("Comma-separated word-count classes to keep: 1,2,3"),
                )
                .arg(
                    Arg::new("top")
                        .long("top")
                        .value_name("NUM")
                        .help("How many keywords to print")
                        .default_value("40"),
                ),
        )
        .subcommand(
            Command::new("history")
                .about("Show the search log")
                .arg(
                    Arg::new("clear")
                        .long("clear")
                        .help("Delete the whole search log")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("failed to load config, using defaults: {}", e);
        Config::default()
    });

    match matches.subcommand() {
        Some(("research", sub)) => {
            apply_overrides(&mut config, sub)?;
            run_research_command(&config, sub).await
        }
        Some(("keywords", sub)) => {
            apply_overrides(&mut config, sub)?;
            run_keywords_command(&config, sub).await
        }
        Some(("history", sub)) => run_history_command(&config, sub.get_flag("clear")).await,
        _ => unreachable!("subcommand is required"),
    }
}

fn apply_overrides(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    if let Some(mode) = matches.get_one::<String>("mode") {
        config.scan_mode = ScanMode::from_name(mode)?;
    }
    if let Some(days) = matches.get_one::<String>("days-back") {
        config.filters.days_back = days.parse()?;
    }
    if let Some(views) = matches.get_one::<String>("min-views") {
        config.filters.min_views = views.parse()?;
    }
    if let Some(subs) = matches.get_one::<String>("max-subs") {
        config.filters.max_subscribers = subs.parse()?;
    }
    if let Some(min) = matches.get_one::<String>("min-duration") {
        config.filters.min_duration_seconds = min.parse()?;
    }
    if let Some(max) = matches.get_one::<String>("max-duration") {
        config.filters.max_duration_seconds = Some(max.parse()?);
    }
    config.validate()
}

fn research_params(config: &Config, matches: &clap::ArgMatches, target: usize) -> Result<ResearchParams> {
    let target_count = match matches.get_one::<String>("limit") {
        Some(raw) => raw.parse()?,
        None => target,
    };
    Ok(ResearchParams {
        query: matches
            .get_one::<String>("query")
            .cloned()
            .unwrap_or_default(),
        target_count,
        days_back: config.filters.days_back,
        filter: FilterParams {
            min_duration: config.filters.min_duration_seconds,
            max_duration: config.filters.max_duration_seconds.unwrap_or(u64::MAX),
            min_views: config.filters.min_views,
            max_subscribers: config.filters.max_subscribers,
        },
    })
}

async fn run_research_command(config: &Config, matches: &clap::ArgMatches) -> Result<()> {
    let params = research_params(config, matches, config.scan_mode.research_target())?;
    let client = YouTubeClient::new(config.network.request_timeout_seconds);
    let mut rotator = KeyRotator::new(config.api_keys.clone());

    info!(
        "research: query={:?} mode={} target={}",
        params.query,
        config.scan_mode.name(),
        params.target_count
    );

    let mut progress = |collected: usize, target: usize| {
        info!("scanning... {}/{}", collected, target);
    };
    let outcome = run_research(&client, &mut rotator, &params, Some(&mut progress)).await?;

    let store = HistoryStore::new(&config.storage.data_dir);
    if let Err(e) = store
        .record_search(&params.query, config.scan_mode.name())
        .await
    {
        warn!("failed to record search history: {}", e);
    }

    let report = &outcome.report;
    info!(
        "scanned {} videos: {} passed, {} blocked by duration, {} by views, {} by subscribers{}",
        outcome.total_scanned,
        report.filter.passed,
        report.filter.blocked_duration,
        report.filter.blocked_views,
        report.filter.blocked_subs,
        if report.filter.auto_rescued {
            " (auto-rescued from the subscriber filter)"
        } else {
            ""
        }
    );

    if outcome.videos.is_empty() {
        println!("No videos passed the filters. Loosen them or widen the scan.");
        return Ok(());
    }

    for (rank, video) in outcome.videos.iter().enumerate() {
        println!(
            "{:>3}. {} | {} views | {} subs | {} | eng {:.2}% | {}",
            rank + 1,
            video.detail.title,
            video.detail.view_count,
            video.subscriber_count,
            video.duration_text,
            video.engagement_rate,
            video.url
        );
    }
    println!(
        "\n{} videos from {} channels, {} total views reached",
        report.videos_processed, report.unique_channels, report.total_views_reached
    );
    Ok(())
}

async fn run_keywords_command(config: &Config, matches: &clap::ArgMatches) -> Result<()> {
    let params = research_params(config, matches, config.scan_mode.keyword_target())?;
    let client = YouTubeClient::new(config.network.request_timeout_seconds);
    let mut rotator = KeyRotator::new(config.api_keys.clone());

    let target_classes = parse_word_classes(matches.get_one::<String>("word-classes"))?;
    let top: usize = matches
        .get_one::<String>("top")
        .map(|t| t.parse())
        .transpose()?
        .unwrap_or(40);

    let mut progress = |collected: usize, target: usize| {
        info!("scanning... {}/{}", collected, target);
    };
    let outcome = run_research(&client, &mut rotator, &params, Some(&mut progress)).await?;

    let store = HistoryStore::new(&config.storage.data_dir);
    if let Err(e) = store
        .record_search(&params.query, config.scan_mode.name())
        .await
    {
        warn!("failed to record search history: {}", e);
    }

    let mut records = keywords::aggregate(&outcome.details(), &target_classes);
    records.sort_by(|a, b| {
        b.viral_score
            .partial_cmp(&a.viral_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if records.is_empty() {
        println!(
            "No keywords cleared the frequency gate ({} videos analyzed).",
            outcome.report.videos_processed
        );
        return Ok(());
    }

    for (rank, record) in records.iter().take(top).enumerate() {
        println!(
            "{:>3}. {:<40} {:>8} | seen in {:>3} videos | avg {:>10} views | score {:>5.1}",
            rank + 1,
            record.keyword,
            record.word_class.label(),
            record.occurrences,
            record.avg_views,
            record.viral_score
        );
    }
    println!(
        "\n{} keywords from {} accepted videos ({} scanned)",
        records.len(),
        outcome.report.videos_processed,
        outcome.total_scanned
    );
    Ok(())
}

async fn run_history_command(config: &Config, clear: bool) -> Result<()> {
    let store = HistoryStore::new(&config.storage.data_dir);
    if clear {
        store.clear_search_log().await?;
        println!("Search log cleared.");
        return Ok(());
    }
    let log = store.load_search_log().await;
    if log.is_empty() {
        println!("No searches recorded yet.");
        return Ok(());
    }
    for entry in log {
        println!("{} [{}] {}", entry.time, entry.mode, entry.query);
    }
    Ok(())
}

fn parse_word_classes(raw: Option<&String>) -> Result<Vec<WordClass>> {
    let raw = match raw {
        Some(r) => r,
        None => return Ok(Vec::new()),
    };
    let mut classes = Vec::new();
    for part in raw.split(',') {
        match part.trim() {
            "1" => classes.push(WordClass::Single),
            "2" => classes.push(WordClass::Pair),
            "3" => classes.push(WordClass::Phrase),
            other => anyhow::bail!("unknown word class {:?} (expected 1, 2 or 3)", other),
        }
    }
    Ok(classes)
}

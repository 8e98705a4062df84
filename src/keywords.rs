use crate::models::{KeywordRecord, VideoDetail, WordClass};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;

/// Candidates containing any of these phrases are resolution/quality noise,
/// not topics.
const TECHNICAL_JUNK: &[&str] = &[
    "hd",
    "4k",
    "1080p",
    "hq",
    "official video",
    "lyric video",
    "official audio",
];

/// Glue words and platform boilerplate that never make useful keywords.
const STOPWORDS: &[&str] = &[
    "and", "the", "with", "for", "you", "from", "in", "on", "at", "to", "of", "by", "my", "is",
    "a", "it", "video", "videos", "lyric", "lyrics", "official", "hd", "4k", "mv",
];

/// A keyword only counts once it appears in at least this many videos.
const MIN_FREQUENCY: u64 = 3;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+").expect("word pattern is valid"))
}

#[derive(Debug, Clone)]
struct Accum {
    count: u64,
    total_views: u64,
    total_likes: u64,
    class: WordClass,
}

impl Accum {
    fn avg_views(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.total_views / self.count
        }
    }
}

/// Aggregate keyword statistics over a set of videos and score each
/// surviving keyword for viral potential.
///
/// Candidates are the declared tags plus title words longer than 3
/// characters, lowercased and trimmed. Only the requested word-count
/// classes are kept (an empty slice means all three). After accumulation,
/// keywords seen in fewer than [`MIN_FREQUENCY`] videos are dropped, then
/// single words are backfilled out of qualifying multi-word phrases.
/// Output order is unspecified; callers sort.
pub fn aggregate(items: &[VideoDetail], target_classes: &[WordClass]) -> Vec<KeywordRecord> {
    let targets: HashSet<WordClass> = if target_classes.is_empty() {
        [WordClass::Single, WordClass::Pair, WordClass::Phrase].into()
    } else {
        target_classes.iter().copied().collect()
    };

    let mut stats: HashMap<String, Accum> = HashMap::new();

    for item in items {
        let title_lower = item.title.to_lowercase();
        let title_words = word_pattern()
            .find_iter(&title_lower)
            .map(|m| m.as_str().to_string())
            .filter(|w| w.len() > 3);

        let candidates = item.tags.iter().cloned().chain(title_words);

        for candidate in candidates {
            let normalized = candidate.to_lowercase().trim().to_string();
            if normalized.is_empty() {
                continue;
            }
            if TECHNICAL_JUNK.iter().any(|junk| normalized.contains(junk)) {
                continue;
            }

            let class = WordClass::of(normalized.split_whitespace().count());
            if !targets.contains(&class) {
                continue;
            }

            let entry = stats.entry(normalized).or_insert(Accum {
                count: 0,
                total_views: 0,
                total_likes: 0,
                class,
            });
            entry.count += 1;
            entry.total_views += item.view_count;
            entry.total_likes += item.like_count;
        }
    }

    stats.retain(|_, accum| accum.count >= MIN_FREQUENCY);
    backfill_single_words(&mut stats);

    let records: Vec<KeywordRecord> = stats
        .into_iter()
        .filter(|(keyword, _)| !STOPWORDS.contains(&keyword.as_str()))
        .map(|(keyword, accum)| score(keyword, accum))
        .collect();

    debug!("aggregated {} keyword records", records.len());
    records
}

/// Promote the individual words of well-performing multi-word keywords to
/// synthetic single-word records carrying the parent's sums.
///
/// Words already present as real single-word records are left alone, as
/// are stopwords and words of 2 characters or fewer. When two parents
/// produce the same word, the one with the higher average views per
/// occurrence wins; on an exact tie the first processed parent stays.
fn backfill_single_words(stats: &mut HashMap<String, Accum>) {
    let existing_singles: HashSet<String> = stats
        .iter()
        .filter(|(_, accum)| accum.class == WordClass::Single)
        .map(|(keyword, _)| keyword.clone())
        .collect();

    let mut synthetic: HashMap<String, Accum> = HashMap::new();

    for (keyword, accum) in stats.iter() {
        if accum.class == WordClass::Single || accum.count < MIN_FREQUENCY {
            continue;
        }
        for word in keyword.split_whitespace() {
            let word = word.trim();
            if word.len() <= 2 || STOPWORDS.contains(&word) || existing_singles.contains(word) {
                continue;
            }
            let candidate = Accum {
                class: WordClass::Single,
                ..accum.clone()
            };
            let replace = match synthetic.get(word) {
                // Strict comparison: ties keep the first parent seen.
                Some(previous) => candidate.avg_views() > previous.avg_views(),
                None => true,
            };
            if replace {
                synthetic.insert(word.to_string(), candidate);
            }
        }
    }

    for (word, accum) in synthetic {
        stats.entry(word).or_insert(accum);
    }
}

/// Composite viral score, bounded to [0, 100] by construction:
/// up to 40 points for average views, 30 for frequency, 30 for the
/// like-to-view engagement ratio.
fn score(keyword: String, accum: Accum) -> KeywordRecord {
    let freq = accum.count as f64;
    let avg_views = accum.total_views as f64 / freq;
    let avg_likes = accum.total_likes as f64 / freq;

    let score_view = (avg_views / 50_000.0 * 40.0).min(40.0);
    let score_freq = (freq * 10.0).min(30.0);
    let score_eng = (avg_likes / (avg_views + 1.0) * 100.0 * 10.0).min(30.0);

    KeywordRecord {
        keyword,
        word_class: accum.class,
        occurrences: accum.count,
        total_views: accum.total_views,
        total_likes: accum.total_likes,
        avg_views: avg_views as u64,
        engagement_score: score_eng,
        viral_score: score_view + score_freq + score_eng,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(title: &str, tags: &[&str], views: u64, likes: u64) -> VideoDetail {
        VideoDetail {
            video_id: format!("id-{}", title),
            channel_id: "chan".to_string(),
            title: title.to_string(),
            description: String::new(),
            duration_seconds: 600,
            view_count: views,
            like_count: likes,
            comment_count: 0,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            thumbnail_url: None,
        }
    }

    fn find<'a>(records: &'a [KeywordRecord], keyword: &str) -> Option<&'a KeywordRecord> {
        records.iter().find(|r| r.keyword == keyword)
    }

    #[test]
    fn test_pair_aggregation_and_backfill() {
        let items = vec![
            video("one", &["ai tools"], 10_000, 100),
            video("two", &["ai tools"], 20_000, 200),
            video("three", &["ai tools"], 30_000, 300),
        ];
        let records = aggregate(&items, &[]);

        let pair = find(&records, "ai tools").expect("pair record");
        assert_eq!(pair.occurrences, 3);
        assert_eq!(pair.avg_views, 20_000);
        assert_eq!(pair.word_class, WordClass::Pair);

        // "tools" is backfilled with the parent's sums; "ai" is only two
        // characters and stays out.
        let tools = find(&records, "tools").expect("backfilled record");
        assert_eq!(tools.occurrences, 3);
        assert_eq!(tools.total_views, 60_000);
        assert_eq!(tools.word_class, WordClass::Single);
        assert!(find(&records, "ai").is_none());
    }

    #[test]
    fn test_frequency_gate_drops_rare_keywords() {
        let items = vec![
            video("one", &["seldom"], 10_000, 100),
            video("two", &["seldom"], 10_000, 100),
            video("three", &["common"], 10_000, 100),
            video("four", &["common"], 10_000, 100),
            video("five", &["common"], 10_000, 100),
        ];
        let records = aggregate(&items, &[]);
        assert!(find(&records, "seldom").is_none());
        assert!(find(&records, "common").is_some());
    }

    #[test]
    fn test_technical_junk_discarded() {
        let items: Vec<_> = (0..3)
            .map(|i| {
                video(
                    &format!("v{}", i),
                    &["song official video", "1080p remaster", "actual topic"],
                    5_000,
                    50,
                )
            })
            .collect();
        let records = aggregate(&items, &[]);
        assert!(find(&records, "song official video").is_none());
        assert!(find(&records, "1080p remaster").is_none());
        assert!(find(&records, "actual topic").is_some());
    }

    #[test]
    fn test_title_words_longer_than_three_chars() {
        let items: Vec<_> = (0..3)
            .map(|i| video(&format!("the cat learns juggling {}", i), &[], 5_000, 50))
            .collect();
        let records = aggregate(&items, &[WordClass::Single]);
        assert!(find(&records, "juggling").is_some());
        assert!(find(&records, "learns").is_some());
        // "cat" has three characters, "the" is a stopword anyway.
        assert!(find(&records, "cat").is_none());
        assert!(find(&records, "the").is_none());
    }

    #[test]
    fn test_class_filter() {
        let items: Vec<_> = (0..3)
            .map(|i| video(&format!("v{}", i), &["solo", "two words", "three word phrase"], 1_000, 10))
            .collect();
        let records = aggregate(&items, &[WordClass::Pair]);
        assert!(find(&records, "two words").is_some());
        assert!(find(&records, "solo").is_none());
        assert!(find(&records, "three word phrase").is_none());
    }

    #[test]
    fn test_backfill_keeps_higher_average_parent() {
        let mut items: Vec<_> = (0..3)
            .map(|i| video(&format!("a{}", i), &["rust tips"], 100_000, 500))
            .collect();
        items.extend((0..3).map(|i| video(&format!("b{}", i), &["rust tricks"], 1_000, 5)));

        let records = aggregate(&items, &[]);
        let rust = find(&records, "rust").expect("backfilled record");
        assert_eq!(rust.total_views, 300_000);
        assert_eq!(rust.occurrences, 3);
    }

    #[test]
    fn test_backfill_never_overwrites_real_single() {
        let mut items: Vec<_> = (0..3)
            .map(|i| video(&format!("a{}", i), &["rust", "rust tips"], 1_000, 5))
            .collect();
        items.extend((0..3).map(|i| video(&format!("b{}", i), &["rust tips"], 100_000, 500)));

        let records = aggregate(&items, &[]);
        let rust = find(&records, "rust").expect("real single record");
        // The real single-word record keeps its own accumulation.
        assert_eq!(rust.occurrences, 3);
        assert_eq!(rust.total_views, 3_000);
    }

    #[test]
    fn test_score_bounds() {
        let cases = vec![
            video("zero", &[], 0, 0),
            video("huge", &["massive topic"], u32::MAX as u64, u32::MAX as u64),
        ];
        let mut items = Vec::new();
        for c in &cases {
            for i in 0..5 {
                let mut v = c.clone();
                v.video_id = format!("{}-{}", v.video_id, i);
                items.push(v);
            }
        }
        let records = aggregate(&items, &[]);
        assert!(!records.is_empty());
        for record in &records {
            assert!(record.viral_score >= 0.0, "{:?}", record);
            assert!(record.viral_score <= 100.0, "{:?}", record);
        }
    }

    #[test]
    fn test_stopwords_absent_from_output() {
        let items: Vec<_> = (0..3)
            .map(|i| video(&format!("v{}", i), &["official", "videos"], 5_000, 50))
            .collect();
        let records = aggregate(&items, &[]);
        assert!(find(&records, "official").is_none());
        assert!(find(&records, "videos").is_none());
    }
}

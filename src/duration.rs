use regex::Regex;
use std::sync::OnceLock;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^P(?:(\d+)D)?T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$")
            .expect("duration pattern is valid")
    })
}

/// Parse an ISO-8601 style duration token (`PT1H2M3S`, `PT45S`, `P1DT2H`)
/// into seconds. Missing components count as zero. Malformed tokens decode
/// to 0 rather than failing: upstream occasionally emits odd tokens and a
/// zero-length video is filtered out downstream anyway.
pub fn parse_duration(token: &str) -> u64 {
    let captures = match duration_pattern().captures(token.trim()) {
        Some(c) => c,
        None => return 0,
    };

    let component = |idx: usize| -> u64 {
        captures
            .get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    component(1) * 86_400 + component(2) * 3_600 + component(3) * 60 + component(4)
}

/// Render seconds as a short human string. The hour segment is omitted
/// when zero: `1h 2m 3s`, `2m 3s`.
pub fn format_duration(seconds: u64) -> String {
    let h = seconds / 3_600;
    let m = (seconds % 3_600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else {
        format!("{}m {}s", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_token() {
        assert_eq!(parse_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_duration("PT58M"), 3480);
        assert_eq!(parse_duration("PT45S"), 45);
        assert_eq!(parse_duration("PT2H"), 7200);
    }

    #[test]
    fn test_parse_day_component() {
        assert_eq!(parse_duration("P1DT1H"), 90000);
    }

    #[test]
    fn test_malformed_decodes_to_zero() {
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("garbage"), 0);
        assert_eq!(parse_duration("1:02:03"), 0);
        assert_eq!(parse_duration("PTXS"), 0);
    }

    #[test]
    fn test_format_omits_zero_hours() {
        assert_eq!(format_duration(3723), "1h 2m 3s");
        assert_eq!(format_duration(123), "2m 3s");
        assert_eq!(format_duration(0), "0m 0s");
    }

    #[test]
    fn test_round_trip() {
        for seconds in [0u64, 59, 60, 3599, 3600, 3723, 86399] {
            let h = seconds / 3600;
            let m = (seconds % 3600) / 60;
            let s = seconds % 60;
            let token = format!("PT{}H{}M{}S", h, m, s);
            assert_eq!(parse_duration(&token), seconds);
        }
    }
}

use chrono::{DateTime, TimeZone, Utc};

/// Lit un horodatage RFC 3339, ou un epoch en millisecondes.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_timestamp("2024-03-01T10:00:00.000+02:00").map(|t| t.timestamp());
        assert_eq!(parsed, Some(1_709_280_000));
    }

    #[test]
    fn parses_epoch_millis() {
        let parsed = parse_timestamp("1709287200000").map(|t| t.timestamp_millis());
        assert_eq!(parsed, Some(1_709_287_200_000));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("now-6h").is_none());
        assert!(parse_timestamp("  ").is_none());
    }
}

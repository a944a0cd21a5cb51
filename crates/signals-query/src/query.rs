//! Query parameters.

use chrono::{DateTime, Utc};

/// Page size when none (or garbage) is requested.
pub const DEFAULT_LIMIT: usize = 50;

/// Largest page a caller can ask for.
pub const MAX_LIMIT: usize = 200;

/// Filters for a signal listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalQuery {
    /// Exact signal type
    pub signal_type: Option<String>,
    /// Symbol, compared case-insensitively
    pub symbol: Option<String>,
    /// Only signals strictly newer than this instant
    pub since: Option<DateTime<Utc>>,
    /// Maximum results, already clamped
    pub limit: usize,
}

impl SignalQuery {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            ..Default::default()
        }
    }

    pub fn with_type(mut self, signal_type: impl Into<String>) -> Self {
        self.signal_type = Some(signal_type.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }
}

/// Parse a raw `limit` parameter.
///
/// Reads an optional sign and the leading digits, ignoring whatever follows
/// (`"12.5"` is 12). Input without leading digits gives [`DEFAULT_LIMIT`];
/// any number, however large, is clamped to `1..=MAX_LIMIT`.
pub fn parse_limit(raw: Option<&str>) -> usize {
    let Some(raw) = raw.map(str::trim) else {
        return DEFAULT_LIMIT;
    };
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return DEFAULT_LIMIT;
    }
    if negative {
        return 1;
    }

    // More digits than MAX_LIMIT has cannot fit under it once leading zeros go.
    let significant = rest[..digits].trim_start_matches('0');
    if significant.len() > 3 {
        return MAX_LIMIT;
    }
    significant
        .parse::<usize>()
        .unwrap_or(0)
        .clamp(1, MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None), 50);
        assert_eq!(parse_limit(Some("abc")), 50);
        assert_eq!(parse_limit(Some("")), 50);
        assert_eq!(parse_limit(Some("10")), 10);
        assert_eq!(parse_limit(Some(" 7 ")), 7);
        assert_eq!(parse_limit(Some("500")), 200);
        assert_eq!(parse_limit(Some("0")), 1);
        assert_eq!(parse_limit(Some("-3")), 1);
    }

    #[test]
    fn test_parse_limit_edges() {
        assert_eq!(parse_limit(Some("99999999999999999999")), 200);
        assert_eq!(parse_limit(Some("-99999999999999999999")), 1);
        assert_eq!(parse_limit(Some("10abc")), 10);
        assert_eq!(parse_limit(Some("12.5")), 12);
        assert_eq!(parse_limit(Some("+20")), 20);
        assert_eq!(parse_limit(Some("0007")), 7);
        assert_eq!(parse_limit(Some("000")), 1);
        assert_eq!(parse_limit(Some("-")), 50);
        assert_eq!(parse_limit(Some("-abc")), 50);
        assert_eq!(parse_limit(Some(".5")), 50);
    }

    #[test]
    fn test_with_limit_clamps() {
        assert_eq!(SignalQuery::new().with_limit(1000).limit, 200);
        assert_eq!(SignalQuery::new().with_limit(0).limit, 1);
        assert_eq!(SignalQuery::new().limit, 50);
    }
}

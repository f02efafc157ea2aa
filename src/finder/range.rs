//! Range expression parsing.
//!
//! Size, date and depth predicates are all written as `[comparator]value`
//! strings ("> 1M", "since 10 hours ago", "< 3"). Parsing happens eagerly
//! when the predicate is configured, so a malformed expression aborts
//! before any traversal begins. Relative date expressions keep their
//! duration and are resolved against a single reference instant captured
//! when iteration starts, never re-sampled per entry.

use std::time::{Duration, SystemTime};

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::errors::{FindError, FindResult};

/// Comparison operator in a range expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Comparator {
    fn compare<T: PartialOrd>(self, left: &T, right: &T) -> bool {
        match self {
            Comparator::Lt => left < right,
            Comparator::Le => left <= right,
            Comparator::Eq => left == right,
            Comparator::Ge => left >= right,
            Comparator::Gt => left > right,
        }
    }
}

/// Split a leading comparator off an expression. A missing comparator
/// defaults to equality.
fn split_comparator(expr: &str) -> (Comparator, &str) {
    let expr = expr.trim();
    for (token, cmp) in [
        ("<=", Comparator::Le),
        (">=", Comparator::Ge),
        ("==", Comparator::Eq),
        ("<", Comparator::Lt),
        (">", Comparator::Gt),
        ("=", Comparator::Eq),
    ] {
        if let Some(rest) = expr.strip_prefix(token) {
            return (cmp, rest.trim_start());
        }
    }
    (Comparator::Eq, expr)
}

/// A size predicate: comparator plus a resolved byte count.
#[derive(Debug, Clone, Copy)]
pub struct SizeConstraint {
    cmp: Comparator,
    bytes: u64,
}

impl SizeConstraint {
    /// Parse an expression such as `"> 1M"` or `"<= 512ki"`.
    ///
    /// Units `k`/`m`/`g` are decimal (x1000^n); `ki`/`mi`/`gi` are binary
    /// (x1024^n). Case-insensitive.
    pub fn parse(expr: &str) -> FindResult<Self> {
        let (cmp, rest) = split_comparator(expr);
        let rest = rest.trim();
        let split = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let (number, unit) = rest.split_at(split);

        let value: f64 = number.parse().map_err(|_| FindError::InvalidRange {
            expr: expr.to_string(),
            message: format!("expected a number, found '{rest}'"),
        })?;

        let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
            "" => 1,
            "k" => 1000,
            "m" => 1000 * 1000,
            "g" => 1000 * 1000 * 1000,
            "ki" => 1024,
            "mi" => 1024 * 1024,
            "gi" => 1024 * 1024 * 1024,
            other => {
                return Err(FindError::InvalidRange {
                    expr: expr.to_string(),
                    message: format!("unknown size unit '{other}'"),
                })
            }
        };

        Ok(Self {
            cmp,
            bytes: (value * multiplier as f64) as u64,
        })
    }

    pub fn matches(&self, size: u64) -> bool {
        self.cmp.compare(&size, &self.bytes)
    }
}

/// A parsed date expression, kept unresolved until iteration begins.
#[derive(Debug, Clone, Copy)]
pub struct DateConstraint {
    cmp: Comparator,
    spec: DateSpec,
}

#[derive(Debug, Clone, Copy)]
enum DateSpec {
    Absolute(SystemTime),
    /// Seconds before the reference instant ("<N> <unit> ago").
    Ago(u64),
}

impl DateConstraint {
    /// Parse an expression such as `"> 2016-01-01"`, `"10 hours ago"`,
    /// `"since 2 days ago"` or `"until 2020-06-06 12:00:00"`.
    pub fn parse(expr: &str) -> FindResult<Self> {
        let trimmed = expr.trim();
        let (cmp, rest) = if let Some(rest) = strip_keyword(trimmed, "since") {
            (Comparator::Ge, rest)
        } else if let Some(rest) = strip_keyword(trimmed, "until") {
            (Comparator::Le, rest)
        } else {
            split_comparator(trimmed)
        };

        let spec = parse_date_spec(rest).ok_or_else(|| FindError::InvalidRange {
            expr: expr.to_string(),
            message: format!("unrecognized date '{rest}'"),
        })?;

        Ok(Self { cmp, spec })
    }

    /// Resolve against the reference instant and test a timestamp.
    pub fn matches(&self, time: SystemTime, reference: SystemTime) -> bool {
        let target = match self.spec {
            DateSpec::Absolute(t) => t,
            DateSpec::Ago(secs) => reference
                .checked_sub(Duration::from_secs(secs))
                .unwrap_or(SystemTime::UNIX_EPOCH),
        };
        self.cmp.compare(&time, &target)
    }
}

fn strip_keyword<'a>(expr: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = expr.strip_prefix(keyword)?;
    // Must be a whole word, not a prefix of a date.
    rest.strip_prefix(' ').map(str::trim_start)
}

fn parse_date_spec(s: &str) -> Option<DateSpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_suffix("ago") {
        return parse_relative(rest.trim_end()).map(DateSpec::Ago);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return local_to_system(dt).map(DateSpec::Absolute);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return local_to_system(date.and_hms_opt(0, 0, 0)?).map(DateSpec::Absolute);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return local_to_system(date.and_hms_opt(0, 0, 0)?).map(DateSpec::Absolute);
    }

    None
}

/// Parse `"<N> <unit>"` into seconds.
fn parse_relative(s: &str) -> Option<u64> {
    let mut parts = s.split_whitespace();
    let count: u64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let seconds: u64 = match unit.trim_end_matches('s') {
        "second" | "sec" => 1,
        "minute" | "min" => 60,
        "hour" => 3600,
        "day" => 86_400,
        "week" => 7 * 86_400,
        "month" => 30 * 86_400,
        "year" => 365 * 86_400,
        _ => return None,
    };
    // An absurdly large count must fail the parse, not overflow.
    count.checked_mul(seconds)
}

fn local_to_system(dt: NaiveDateTime) -> Option<SystemTime> {
    Local
        .from_local_datetime(&dt)
        .earliest()
        .map(SystemTime::from)
}

/// Inclusive depth bounds relative to a root (depth 0 = direct children).
///
/// Multiple `depth()` expressions intersect; an empty range yields nothing.
#[derive(Debug, Clone, Copy)]
pub struct DepthRange {
    pub min: usize,
    pub max: usize,
}

impl Default for DepthRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: usize::MAX,
        }
    }
}

impl DepthRange {
    /// Narrow the range with one more expression such as `"< 3"` or `"== 1"`.
    pub fn narrow(&mut self, expr: &str) -> FindResult<()> {
        let (cmp, rest) = split_comparator(expr);
        let value: usize = rest.trim().parse().map_err(|_| FindError::InvalidRange {
            expr: expr.to_string(),
            message: format!("expected a depth number, found '{rest}'"),
        })?;

        match cmp {
            Comparator::Lt => self.max = self.max.min(value.saturating_sub(1)),
            Comparator::Le => self.max = self.max.min(value),
            Comparator::Eq => {
                self.min = self.min.max(value);
                self.max = self.max.min(value);
            }
            Comparator::Ge => self.min = self.min.max(value),
            Comparator::Gt => self.min = self.min.max(value.saturating_add(1)),
        }
        // "< 0" leaves an empty range rather than an error.
        if matches!(cmp, Comparator::Lt) && value == 0 {
            self.min = 1;
            self.max = 0;
        }
        Ok(())
    }

    pub fn contains(&self, depth: usize) -> bool {
        depth >= self.min && depth <= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_size_units() {
        let c = SizeConstraint::parse("> 1M").unwrap();
        assert!(!c.matches(1_000_000));
        assert!(c.matches(1_000_001));

        let c = SizeConstraint::parse("<= 2ki").unwrap();
        assert!(c.matches(2048));
        assert!(!c.matches(2049));
    }

    #[test]
    fn test_size_default_comparator_is_equality() {
        let c = SizeConstraint::parse("512").unwrap();
        assert!(c.matches(512));
        assert!(!c.matches(513));
    }

    #[test]
    fn test_size_fractional_value() {
        let c = SizeConstraint::parse(">= 1.5k").unwrap();
        assert!(c.matches(1500));
        assert!(!c.matches(1499));
    }

    #[test]
    fn test_size_bad_unit() {
        assert!(SizeConstraint::parse("> 1X").is_err());
        assert!(SizeConstraint::parse("huge").is_err());
    }

    #[test]
    fn test_date_absolute() {
        let c = DateConstraint::parse("> 1991-01-01").unwrap();
        let now = SystemTime::now();
        assert!(c.matches(now, now));

        let c = DateConstraint::parse("< 1991-12-31").unwrap();
        assert!(!c.matches(now, now));
    }

    #[test]
    fn test_date_relative_uses_reference() {
        let c = DateConstraint::parse("since 10 hours ago").unwrap();
        let reference = SystemTime::now();
        let recent = reference - Duration::from_secs(3600);
        let old = reference - Duration::from_secs(20 * 3600);
        assert!(c.matches(recent, reference));
        assert!(!c.matches(old, reference));
    }

    #[test]
    fn test_date_until() {
        let c = DateConstraint::parse("until 2 days ago").unwrap();
        let reference = SystemTime::now();
        let old = reference - Duration::from_secs(3 * 86_400);
        let recent = reference - Duration::from_secs(3600);
        assert!(c.matches(old, reference));
        assert!(!c.matches(recent, reference));
    }

    #[test]
    fn test_date_malformed() {
        assert!(DateConstraint::parse("next tuesday").is_err());
        assert!(DateConstraint::parse("> 12 parsecs ago").is_err());
    }

    #[test]
    fn test_date_relative_overflow_rejected() {
        let err = DateConstraint::parse("1000000000000 years ago").unwrap_err();
        assert!(matches!(err, FindError::InvalidRange { .. }));
    }

    #[test]
    fn test_depth_narrowing() {
        let mut range = DepthRange::default();
        range.narrow("< 3").unwrap();
        assert!(range.contains(0));
        assert!(range.contains(2));
        assert!(!range.contains(3));

        let mut range = DepthRange::default();
        range.narrow(">= 3").unwrap();
        assert!(!range.contains(2));
        assert!(range.contains(3));
        assert!(range.contains(10));
    }

    #[test]
    fn test_depth_intersection() {
        let mut range = DepthRange::default();
        range.narrow("> 0").unwrap();
        range.narrow("<= 2").unwrap();
        assert!(!range.contains(0));
        assert!(range.contains(1));
        assert!(range.contains(2));
        assert!(!range.contains(3));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_depth_empty_range() {
        let mut range = DepthRange::default();
        range.narrow("> 5").unwrap();
        range.narrow("< 3").unwrap();
        assert!(range.is_empty());
    }

    #[test]
    fn test_depth_malformed() {
        let mut range = DepthRange::default();
        assert!(range.narrow("deep").is_err());
    }
}

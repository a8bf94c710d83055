//! Timestamp rendering

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use crate::core::{LogError, LogResult};

/// Default rendering of [`crate::Formatter`]: `2023-11-14 22:13:20.123`
const ISO_MILLIS: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Default rendering of the standard formatter: `2023-11-14 22:13:20,123`
const COMMA_MILLIS: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// How a formatter renders `asctime` when no date format is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeStyle {
    /// Space-separated ISO date and time, dot before milliseconds
    #[default]
    IsoMillis,
    /// Same, with a comma before milliseconds
    CommaMillis,
}

/// A validated, pre-parsed date format
#[derive(Debug, Clone)]
pub struct DateFormat {
    source: String,
    items: Vec<Item<'static>>,
}

impl DateFormat {
    /// Parse a strftime-style pattern.
    ///
    /// `%f` renders six-digit microseconds; every other directive follows
    /// chrono's strftime.
    pub fn parse(datefmt: &str) -> LogResult<Self> {
        let translated = translate(datefmt);
        let items = StrftimeItems::new(&translated)
            .parse_to_owned()
            .map_err(|e| LogError::format(datefmt, e.to_string()))?;
        Ok(Self {
            source: datefmt.to_string(),
            items,
        })
    }

    /// The pattern as configured
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render `created` (seconds since the epoch) in local time
    pub fn render(&self, created: f64) -> String {
        local_datetime(created)
            .format_with_items(self.items.iter())
            .to_string()
    }
}

impl TimeStyle {
    pub(crate) fn render(self, created: f64) -> String {
        let pattern = match self {
            TimeStyle::IsoMillis => ISO_MILLIS,
            TimeStyle::CommaMillis => COMMA_MILLIS,
        };
        local_datetime(created).format(pattern).to_string()
    }
}

/// Render a creation timestamp.
///
/// Without `datefmt` the result is `YYYY-MM-DD HH:MM:SS.mmm` in local time,
/// milliseconds truncated. With `datefmt` the pattern is rendered as given;
/// an invalid pattern is a [`LogError::Format`].
pub fn format_time(created: f64, datefmt: Option<&str>) -> LogResult<String> {
    match datefmt {
        None => Ok(TimeStyle::IsoMillis.render(created)),
        Some(datefmt) => Ok(DateFormat::parse(datefmt)?.render(created)),
    }
}

/// Local date-time of `created`, rounded to the microsecond
pub(crate) fn local_datetime(created: f64) -> DateTime<Local> {
    let mut secs = created.floor() as i64;
    let mut micros = ((created - created.floor()) * 1_000_000.0).round() as u32;
    if micros >= 1_000_000 {
        secs += 1;
        micros -= 1_000_000;
    }
    DateTime::from_timestamp(secs, micros * 1_000)
        .unwrap_or_default()
        .with_timezone(&Local)
}

fn translate(datefmt: &str) -> String {
    let mut out = String::with_capacity(datefmt.len() + 4);
    let mut chars = datefmt.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('f') => out.push_str("%6f"),
            Some(next) => {
                out.push('%');
                out.push(next);
            }
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    const T: f64 = 1_700_000_000.1234;

    fn is_digits(s: &str) -> bool {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_default_shape() {
        let rendered = format_time(T, None).unwrap();
        // YYYY-MM-DD HH:MM:SS.mmm
        assert_eq!(rendered.len(), 23);
        let (date, time) = rendered.split_once(' ').unwrap();
        let date: Vec<&str> = date.split('-').collect();
        assert_eq!(date.len(), 3);
        assert!(date.iter().all(|p| is_digits(p)));
        let (hms, millis) = time.split_once('.').unwrap();
        assert_eq!(hms.split(':').count(), 3);
        assert_eq!(millis, "123");
    }

    #[test]
    fn test_default_matches_local_time() {
        let expected = Local
            .timestamp_opt(1_700_000_000, 123_400_000)
            .earliest()
            .unwrap()
            .format("%Y-%m-%d %H:%M:%S%.3f")
            .to_string();
        assert_eq!(format_time(T, None).unwrap(), expected);
    }

    #[test]
    fn test_explicit_date_only() {
        let expected = local_datetime(T).format("%Y-%m-%d").to_string();
        assert_eq!(format_time(T, Some("%Y-%m-%d")).unwrap(), expected);
    }

    #[test]
    fn test_microseconds_directive() {
        let rendered = format_time(T, Some("%S.%f")).unwrap();
        let (_, micros) = rendered.split_once('.').unwrap();
        assert_eq!(micros, "123400");
    }

    #[test]
    fn test_comma_millis() {
        let rendered = TimeStyle::CommaMillis.render(T);
        assert!(rendered.ends_with(",123"), "{rendered}");
    }

    #[rstest]
    #[case("%Y-%m-%d %H:%M:%S.%f", "%Y-%m-%d %H:%M:%S.%6f")]
    #[case("%%f", "%%f")]
    #[case("%.3f", "%.3f")]
    #[case("plain", "plain")]
    #[case("trailing %", "trailing %")]
    fn test_translate(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(translate(input), expected);
    }

    #[test]
    fn test_invalid_directive() {
        assert!(matches!(
            format_time(T, Some("%Q")),
            Err(LogError::Format { .. })
        ));
    }

    #[test]
    fn test_microsecond_carry() {
        let dt = local_datetime(1_700_000_000.999_999_9);
        assert_eq!(dt.timestamp(), 1_700_000_001);
        assert_eq!(dt.timestamp_subsec_micros(), 0);
    }
}

//! File name patterns

use crate::{Error, Result};
use chrono::format::{Fixed, Item, Numeric, StrftimeItems};
use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// The finest calendar unit a file name records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Resolution {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Resolution {
    fn of(item: &Item<'_>) -> Option<Self> {
        match item {
            Item::Numeric(numeric, _) => match numeric {
                Numeric::Second | Numeric::Nanosecond | Numeric::Timestamp => Some(Self::Second),
                Numeric::Minute => Some(Self::Minute),
                Numeric::Hour | Numeric::Hour12 => Some(Self::Hour),
                Numeric::Day
                | Numeric::Ordinal
                | Numeric::NumDaysFromSun
                | Numeric::WeekdayFromMon => Some(Self::Day),
                Numeric::WeekFromSun | Numeric::WeekFromMon | Numeric::IsoWeek => {
                    Some(Self::Week)
                }
                Numeric::Month => Some(Self::Month),
                Numeric::Year
                | Numeric::YearDiv100
                | Numeric::YearMod100
                | Numeric::IsoYear
                | Numeric::IsoYearDiv100
                | Numeric::IsoYearMod100 => Some(Self::Year),
                _ => None,
            },
            Item::Fixed(fixed) => match fixed {
                Fixed::RFC2822 | Fixed::RFC3339 => Some(Self::Second),
                Fixed::ShortWeekdayName | Fixed::LongWeekdayName => Some(Self::Day),
                Fixed::ShortMonthName | Fixed::LongMonthName => Some(Self::Month),
                _ => None,
            },
            _ => None,
        }
    }

    fn advance(self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Second => start.checked_add_signed(TimeDelta::seconds(1)),
            Self::Minute => start.checked_add_signed(TimeDelta::minutes(1)),
            Self::Hour => start.checked_add_signed(TimeDelta::hours(1)),
            Self::Day => start.checked_add_signed(TimeDelta::days(1)),
            Self::Week => start.checked_add_signed(TimeDelta::weeks(1)),
            Self::Month => start.checked_add_months(Months::new(1)),
            Self::Year => start.checked_add_months(Months::new(12)),
        }
    }
}

/// A `chrono` strftime pattern that names one file per bucket.
///
/// The rendered name is a single path component inside the log directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    pattern: String,
    resolution: Resolution,
}

impl FilePattern {
    /// Parse and check a pattern such as `%Y%m%d%H%M.log`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the pattern is empty, has no
    /// placeholder, contains a path separator, or uses an unknown specifier.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();

        if pattern.is_empty() {
            return Err(Error::Configuration("file pattern is empty".to_string()));
        }
        if pattern.contains(['/', '\\']) {
            return Err(Error::Configuration(format!(
                "file pattern must be a file name, got {pattern}"
            )));
        }

        let mut placeholders = 0;
        let mut resolution = Resolution::Year;
        for item in StrftimeItems::new(&pattern) {
            if let Some(unit) = Resolution::of(&item) {
                resolution = resolution.min(unit);
            }
            match item {
                Item::Error => {
                    return Err(Error::Configuration(format!(
                        "invalid specifier in file pattern {pattern}"
                    )));
                }
                Item::Numeric(..) | Item::Fixed(_) => placeholders += 1,
                _ => {}
            }
        }
        if placeholders == 0 {
            return Err(Error::Configuration(format!(
                "file pattern {pattern} has no date/time placeholder"
            )));
        }

        Ok(Self {
            pattern,
            resolution,
        })
    }

    /// The raw pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// File name for the bucket starting at `bucket_start`.
    #[must_use]
    pub fn render(&self, bucket_start: DateTime<Utc>) -> String {
        bucket_start.format(&self.pattern).to_string()
    }

    /// Recover the bucket start from a file name produced by [`Self::render`].
    ///
    /// Patterns without a time of day resolve to midnight.
    #[must_use]
    pub fn parse(&self, name: &str) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(name, &self.pattern)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(name, &self.pattern)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .map(|naive| naive.and_utc())
    }

    /// First instant whose rendered name differs from the name that parses
    /// to `start`.
    ///
    /// A minute pattern covers `[start, start + 1 min)`, a daily one a whole
    /// day. Buckets that began anywhere inside that span share the name.
    #[must_use]
    pub fn name_end(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.resolution.advance(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_and_parse_minute_pattern() {
        let pattern = FilePattern::new("%Y%m%d%H%M.log").unwrap();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

        let name = pattern.render(start);
        assert_eq!(name, "202405011230.log");
        assert_eq!(pattern.parse(&name), Some(start));
    }

    #[test]
    fn test_parse_date_only_pattern() {
        let pattern = FilePattern::new("app-%Y-%m-%d.log").unwrap();
        let midnight = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        assert_eq!(pattern.parse("app-2024-05-01.log"), Some(midnight));
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        let pattern = FilePattern::new("%Y%m%d%H%M.log").unwrap();

        assert_eq!(pattern.parse("latest.log"), None);
        assert_eq!(pattern.parse("notes.txt"), None);
    }

    #[test]
    fn test_name_end_follows_finest_field() {
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

        let minutes = FilePattern::new("%Y%m%d%H%M.log").unwrap();
        assert_eq!(
            minutes.name_end(start),
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 1, 0).single()
        );

        let days = FilePattern::new("app-%Y-%m-%d.log").unwrap();
        assert_eq!(
            days.name_end(start),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).single()
        );

        let months = FilePattern::new("%b-%Y.log").unwrap();
        let january = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            months.name_end(january),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).single()
        );
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(FilePattern::new("").is_err());
        assert!(FilePattern::new("static.log").is_err());
        assert!(FilePattern::new("logs/%Y.log").is_err());
        assert!(FilePattern::new("%Q.log").is_err());
    }
}

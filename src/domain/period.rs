use crate::error::{MetricsError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// Reporting window selected by a period token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Year(i32),
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
}

impl Period {
    /// Parse `all`, `YYYY`, `YYYY-MM` or `YYYY-QN`.
    ///
    /// Quarters follow the calendar: Q1 = Jan–Mar ... Q4 = Oct–Dec.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        let invalid = || {
            MetricsError::period(format!(
                "'{}' (expected all, YYYY, YYYY-MM or YYYY-QN)",
                token
            ))
        };

        if token.eq_ignore_ascii_case("all") {
            return Ok(Period::All);
        }

        if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
            let year = token.parse::<i32>().map_err(|_| invalid())?;
            return Ok(Period::Year(year));
        }

        let (year, rest) = token.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;

        if let Some(quarter) = rest.strip_prefix('Q').or_else(|| rest.strip_prefix('q')) {
            let quarter = quarter.parse::<u32>().map_err(|_| invalid())?;
            if !(1..=4).contains(&quarter) {
                return Err(invalid());
            }
            return Ok(Period::Quarter { year, quarter });
        }

        if rest.len() != 2 {
            return Err(invalid());
        }
        let month = rest.parse::<u32>().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Period::Month { year, month })
    }

    /// Half-open date window `[start, end)`, or `None` for `All`
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (start_year, start_month, months) = match *self {
            Period::All => return None,
            Period::Year(year) => (year, 1, 12),
            Period::Month { year, month } => (year, month, 1),
            Period::Quarter { year, quarter } => (year, (quarter - 1) * 3 + 1, 3),
        };
        let start = NaiveDate::from_ymd_opt(start_year, start_month, 1)?;
        let end_index = start_month - 1 + months;
        let end = NaiveDate::from_ymd_opt(
            start_year + (end_index / 12) as i32,
            end_index % 12 + 1,
            1,
        )?;
        Some((start, end))
    }

    /// Whether a commit timestamp falls inside the window (UTC)
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.contains_date(&timestamp.date_naive())
    }

    /// Whether a calendar date falls inside the window
    pub fn contains_date(&self, date: &NaiveDate) -> bool {
        match self.date_range() {
            None => true,
            Some((start, end)) => *date >= start && *date < end,
        }
    }
}

impl FromStr for Period {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        Period::parse(s)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => write!(f, "all"),
            Period::Year(year) => write!(f, "{:04}", year),
            Period::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Period::Quarter { year, quarter } => write!(f, "{:04}-Q{}", year, quarter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(Period::parse("all").unwrap(), Period::All);
        assert_eq!(Period::parse("2025").unwrap(), Period::Year(2025));
        assert_eq!(
            Period::parse("2025-11").unwrap(),
            Period::Month {
                year: 2025,
                month: 11
            }
        );
        assert_eq!(
            Period::parse("2025-Q4").unwrap(),
            Period::Quarter {
                year: 2025,
                quarter: 4
            }
        );
    }

    #[test]
    fn test_parse_invalid_tokens() {
        let tokens = [
            "", "2025-13", "2025-00", "2025-Q5", "2025-Q0", "25-11", "nov", "2025-1", "2025-11-01",
        ];
        for token in tokens {
            assert!(Period::parse(token).is_err(), "accepted {:?}", token);
        }
    }

    #[test]
    fn test_display_round_trips_token() {
        for token in ["all", "2025", "2025-03", "2024-Q2"] {
            assert_eq!(Period::parse(token).unwrap().to_string(), token);
        }
    }

    #[test]
    fn test_month_boundaries() {
        let november = Period::parse("2025-11").unwrap();
        let december = Period::parse("2025-12").unwrap();
        let last_second = ts("2025-11-30T23:59:59Z");

        assert!(november.contains(&last_second));
        assert!(!december.contains(&last_second));
        assert!(!november.contains(&ts("2025-12-01T00:00:00Z")));
        assert!(december.contains(&ts("2025-12-31T23:59:59Z")));
    }

    #[test]
    fn test_quarter_boundaries() {
        let q4 = Period::parse("2025-Q4").unwrap();
        let q3 = Period::parse("2025-Q3").unwrap();
        let first_second = ts("2025-10-01T00:00:00Z");

        assert!(q4.contains(&first_second));
        assert!(!q3.contains(&first_second));
        assert!(q3.contains(&ts("2025-09-30T23:59:59Z")));
    }

    #[test]
    fn test_quarter_ranges() {
        let q1 = Period::parse("2025-Q1").unwrap().date_range().unwrap();
        assert_eq!(q1.0, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(q1.1, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());

        let q4 = Period::parse("2025-Q4").unwrap().date_range().unwrap();
        assert_eq!(q4.1, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_all_contains_everything() {
        assert!(Period::All.contains(&ts("1970-01-01T00:00:00Z")));
        assert!(Period::All.contains_date(&NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()));
    }

    #[test]
    fn test_contains_date() {
        let year = Period::parse("2025").unwrap();
        assert!(year.contains_date(&NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(!year.contains_date(&NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }
}

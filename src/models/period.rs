//! Calendar month used for payroll periods.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// A calendar month, written `YYYY-MM`. Serialized as that string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(AppError::validation(format!("Invalid month: {year}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// Month containing the given date.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Constructor guarantees validity.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| AppError::validation(format!("Expected YYYY-MM, got '{s}'")))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| AppError::validation(format!("Invalid year in '{s}'")))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| AppError::validation(format!("Invalid month in '{s}'")))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ym: YearMonth = "2025-06".parse().unwrap();
        assert_eq!(ym, YearMonth { year: 2025, month: 6 });
        assert_eq!(ym.to_string(), "2025-06");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("june".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_month_bounds() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = YearMonth::new(2025, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(dec.next(), YearMonth::new(2026, 1).unwrap());
    }

    #[test]
    fn test_contains_excludes_adjacent_months() {
        let june = YearMonth::new(2025, 6).unwrap();
        assert!(june.contains(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
        assert!(june.contains(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()));
        assert!(!june.contains(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()));
        assert!(!june.contains(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
    }

    #[test]
    fn test_serde_uses_validated_string() {
        let june = YearMonth::new(2025, 6).unwrap();
        assert_eq!(serde_json::to_string(&june).unwrap(), "\"2025-06\"");
        assert_eq!(serde_json::from_str::<YearMonth>("\"2025-06\"").unwrap(), june);
        assert!(serde_json::from_str::<YearMonth>("\"2025-13\"").is_err());
        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2025,"month":13}"#).is_err());
    }
}

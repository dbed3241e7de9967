use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
#[cfg(feature = "backend")]
use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
    ToSql,
};

/// Human readable format used in api responses, e.g. `Thu Jan 05 2023`
pub const DATE_STRING_FORMAT: &str = "%a %b %d %Y";

/// Format the date is stored in. Sorts the same as the dates themselves
pub const STORAGE_FORMAT: &str = "%Y-%m-%d";

const DATE_INPUT_FORMATS: &[&str] = &[
    STORAGE_FORMAT,
    DATE_STRING_FORMAT,
    "%Y/%m/%d",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

const DATE_TIME_INPUT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Calendar date of an exercise. There is no time component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExerciseDate(NaiveDate);

impl ExerciseDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The current date in the server's local time zone
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Parses the date formats a browser or api client is likely to send.
    /// Returns `None` for blank or unrecognised input
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Some(date) = DATE_INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        {
            return Some(Self(date));
        }

        if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(date_time.date_naive()));
        }

        DATE_TIME_INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(|date_time| Self(date_time.date()))
    }

    /// Parses `value`, falling back to `default` when it's missing or unparseable
    pub fn parse_or(value: Option<&str>, default: ExerciseDate) -> Self {
        value.and_then(Self::parse).unwrap_or(default)
    }

    pub fn to_date_string(&self) -> String {
        self.0.format(DATE_STRING_FORMAT).to_string()
    }

    pub fn to_storage_string(&self) -> String {
        self.0.format(STORAGE_FORMAT).to_string()
    }
}

impl From<NaiveDate> for ExerciseDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl fmt::Display for ExerciseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_STRING_FORMAT))
    }
}

impl Serialize for ExerciseDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExerciseDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).ok_or_else(|| de::Error::custom(format!("invalid date: {value:?}")))
    }
}

#[cfg(feature = "backend")]
impl ToSql for ExerciseDate {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(self.to_storage_string().into()))
    }
}

#[cfg(feature = "backend")]
impl FromSql for ExerciseDate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        NaiveDate::parse_from_str(value.as_str()?, STORAGE_FORMAT)
            .map(Self)
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(feature = "backend")]
impl From<ExerciseDate> for sea_query::Value {
    fn from(value: ExerciseDate) -> Self {
        value.to_storage_string().into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn jan_5() -> ExerciseDate {
        ExerciseDate::from_ymd(2023, 1, 5).unwrap()
    }

    #[test]
    fn test_date_string_format() {
        assert_eq!(jan_5().to_date_string(), "Thu Jan 05 2023");
        assert_eq!(jan_5().to_string(), "Thu Jan 05 2023");
    }

    #[test]
    fn test_parse_accepts_common_formats() {
        for input in [
            "2023-01-05",
            " 2023-01-05 ",
            "Thu Jan 05 2023",
            "2023/01/05",
            "January 5, 2023",
            "2023-01-05T23:59:59Z",
            "2023-01-05T08:30",
        ] {
            assert_eq!(ExerciseDate::parse(input), Some(jan_5()), "{input}");
        }
    }

    #[test]
    fn test_parse_rejects_blank_and_garbage() {
        assert_eq!(ExerciseDate::parse(""), None);
        assert_eq!(ExerciseDate::parse("   "), None);
        assert_eq!(ExerciseDate::parse("yesterday"), None);
        assert_eq!(ExerciseDate::parse("2023-02-30"), None);
    }

    #[test]
    fn test_parse_or_falls_back() {
        let fallback = ExerciseDate::from_ymd(2020, 2, 29).unwrap();
        assert_eq!(ExerciseDate::parse_or(None, fallback), fallback);
        assert_eq!(ExerciseDate::parse_or(Some("nope"), fallback), fallback);
        assert_eq!(ExerciseDate::parse_or(Some("2023-01-05"), fallback), jan_5());
    }

    #[test]
    fn test_time_of_day_does_not_change_rendering() {
        let morning = ExerciseDate::parse("2023-01-05T00:00:01Z").unwrap();
        let night = ExerciseDate::parse("2023-01-05T23:59:59Z").unwrap();
        assert_eq!(morning.to_date_string(), night.to_date_string());
    }

    #[test]
    fn test_serializes_as_date_string() {
        assert_eq!(serde_json::to_string(&jan_5()).unwrap(), r#""Thu Jan 05 2023""#);
        let date: ExerciseDate = serde_json::from_str(r#""Thu Jan 05 2023""#).unwrap();
        assert_eq!(date, jan_5());
    }

    #[test]
    fn test_storage_strings_sort_like_dates() {
        let dec = ExerciseDate::from_ymd(2022, 12, 31).unwrap();
        assert!(dec.to_storage_string() < jan_5().to_storage_string());
    }
}

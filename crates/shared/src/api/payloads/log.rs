use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    model::{Exercise, User},
    types::{ExerciseDate, Uuid},
};

/// Raw query string of the log route. Kept as text so a malformed value
/// drops that filter instead of rejecting the request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

impl LogQuery {
    pub fn filter(&self) -> LogFilter {
        let from = parse_bound("from", self.from.as_deref());
        let to = parse_bound("to", self.to.as_deref());
        let limit = self.limit.as_deref().and_then(|limit| {
            match limit.trim().parse::<u64>() {
                Ok(0) | Err(_) => {
                    debug!(limit, "Ignoring limit");
                    None
                }
                Ok(limit) => Some(limit),
            }
        });

        LogFilter { from, to, limit }
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> Option<ExerciseDate> {
    let value = value?;
    let date = ExerciseDate::parse(value);
    if date.is_none() {
        debug!(name, value, "Ignoring unparseable date bound");
    }
    date
}

/// Parsed log filter. Bounds are inclusive
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogFilter {
    pub from: Option<ExerciseDate>,
    pub to: Option<ExerciseDate>,
    pub limit: Option<u64>,
}

impl LogFilter {
    pub fn matches(&self, date: &ExerciseDate) -> bool {
        self.from.map_or(true, |from| from <= *date) && self.to.map_or(true, |to| *date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub date: ExerciseDate,
}

impl From<Exercise> for LogEntry {
    fn from(exercise: Exercise) -> Self {
        Self {
            description: exercise.description,
            duration: exercise.duration,
            date: exercise.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: Uuid,
    pub username: String,
    pub count: usize,
    pub log: Vec<LogEntry>,
}

impl ExerciseLog {
    pub fn new(user: User, exercises: Vec<Exercise>) -> Self {
        let log: Vec<LogEntry> = exercises.into_iter().map(LogEntry::from).collect();
        Self {
            id: user.id,
            username: user.username,
            count: log.len(),
            log,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(day: u32) -> ExerciseDate {
        ExerciseDate::from_ymd(2023, 1, day).unwrap()
    }

    #[test]
    fn test_filter_parses_all_fields() {
        let query = LogQuery {
            from: Some("2023-01-02".into()),
            to: Some("2023-01-04".into()),
            limit: Some("2".into()),
        };
        assert_eq!(
            query.filter(),
            LogFilter {
                from: Some(date(2)),
                to: Some(date(4)),
                limit: Some(2),
            }
        );
    }

    #[test]
    fn test_filter_drops_malformed_values() {
        let query = LogQuery {
            from: Some("last week".into()),
            to: None,
            limit: Some("lots".into()),
        };
        assert_eq!(query.filter(), LogFilter::default());

        let query = LogQuery {
            limit: Some("0".into()),
            ..Default::default()
        };
        assert_eq!(query.filter().limit, None);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let filter = LogFilter {
            from: Some(date(2)),
            to: Some(date(4)),
            limit: None,
        };
        assert!(!filter.matches(&date(1)));
        assert!(filter.matches(&date(2)));
        assert!(filter.matches(&date(4)));
        assert!(!filter.matches(&date(5)));
        assert!(LogFilter::default().matches(&date(1)));
    }

    #[test]
    fn test_log_counts_entries() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
        };
        let exercises = (1..=3)
            .map(|day| Exercise {
                id: Uuid::new_v4(),
                user_id: user.id,
                description: Some(format!("day {day}")),
                duration: Some(10),
                date: date(day),
            })
            .collect();
        let log = ExerciseLog::new(user, exercises);
        assert_eq!(log.count, 3);
        assert_eq!(log.log[2].description.as_deref(), Some("day 3"));
    }
}

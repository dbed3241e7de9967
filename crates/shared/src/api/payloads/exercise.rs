use serde::{Deserialize, Serialize};

use crate::{
    api::response_errors::AddExerciseError,
    model::{Exercise, User},
    types::{ExerciseDate, Uuid},
};

/// Duration as sent by a client. Browsers post form values as strings so
/// numeric text is accepted alongside json numbers. Any other json value is
/// kept in `Other` and rejected by [`DurationInput::minutes`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Whole(i64),
    Fractional(f64),
    Text(String),
    Other(serde_json::Value),
}

impl DurationInput {
    /// Whole minutes, `None` for blank text
    pub fn minutes(&self) -> Result<Option<i64>, AddExerciseError> {
        match self {
            Self::Whole(minutes) => Ok(Some(*minutes)),
            Self::Fractional(value) => whole_minutes(*value)
                .map(Some)
                .ok_or_else(|| self.invalid()),
            Self::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Ok(None)
                } else if let Ok(minutes) = text.parse::<i64>() {
                    Ok(Some(minutes))
                } else {
                    text.parse::<f64>()
                        .ok()
                        .and_then(whole_minutes)
                        .map(Some)
                        .ok_or_else(|| self.invalid())
                }
            }
            Self::Other(_) => Err(self.invalid()),
        }
    }

    fn invalid(&self) -> AddExerciseError {
        let value = match self {
            Self::Whole(minutes) => minutes.to_string(),
            Self::Fractional(value) => value.to_string(),
            Self::Text(text) => text.clone(),
            Self::Other(value) => value.to_string(),
        };
        AddExerciseError::InvalidDuration { value }
    }
}

impl From<i64> for DurationInput {
    fn from(value: i64) -> Self {
        Self::Whole(value)
    }
}

fn whole_minutes(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddExercise {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// The user merged with the exercise that was just added to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserExercise {
    pub id: Uuid,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub date: ExerciseDate,
}

impl UserExercise {
    pub fn new(user: &User, exercise: &Exercise) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            description: exercise.description.clone(),
            duration: exercise.duration,
            date: exercise.date,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::{
    api::{payloads::AddExercise, response_errors::AddExerciseError},
    model::User,
    types::{ExerciseDate, Uuid},
};

#[cfg(feature = "backend")]
use {
    crate::api::payloads::LogFilter,
    exemplar::Model,
    rusqlite::{Connection, OptionalExtension},
    sea_query::{enum_def, Expr, Order, Query, SelectStatement, SqliteQueryBuilder},
    sea_query_rusqlite::RusqliteBinder,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "backend", derive(Model))]
#[cfg_attr(feature = "backend", table("exercise"))]
#[cfg_attr(feature = "backend", enum_def)]
pub struct Exercise {
    pub id: Uuid,
    /// Not a foreign key, the user is only checked when the exercise is added
    pub user_id: Uuid,
    pub description: Option<String>,
    /// Minutes
    pub duration: Option<i64>,
    pub date: ExerciseDate,
}

/// An exercise that hasn't been stored yet. Can only be built for a user that
/// has been looked up
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "backend", derive(Model))]
#[cfg_attr(feature = "backend", table("exercise"))]
pub struct NewExercise {
    id: Uuid,
    user_id: Uuid,
    description: Option<String>,
    duration: Option<i64>,
    date: ExerciseDate,
}

impl NewExercise {
    /// `today` is used when the payload has no date or one that doesn't parse
    pub fn new(
        user: &User,
        payload: AddExercise,
        today: ExerciseDate,
    ) -> Result<Self, AddExerciseError> {
        let AddExercise {
            description,
            duration,
            date,
        } = payload;

        let duration = match duration {
            Some(duration) => duration.minutes()?,
            None => None,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user.id,
            description,
            duration,
            date: ExerciseDate::parse_or(date.as_deref(), today),
        })
    }

    pub fn date(&self) -> ExerciseDate {
        self.date
    }
}

#[cfg(feature = "backend")]
impl Exercise {
    fn select_star() -> SelectStatement {
        Query::select()
            .columns([
                ExerciseIden::Id,
                ExerciseIden::UserId,
                ExerciseIden::Description,
                ExerciseIden::Duration,
                ExerciseIden::Date,
            ])
            .from(ExerciseIden::Table)
            .to_owned()
    }

    pub fn fetch_by_id(conn: &Connection, id: &Uuid) -> Result<Option<Exercise>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ExerciseIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let exercise = stmt
            .query_row(&*values.as_params(), Exercise::from_row)
            .optional()?;
        Ok(exercise)
    }

    /// A user's exercises in insertion order, restricted by `filter`
    pub fn fetch_log(
        conn: &Connection,
        user_id: &Uuid,
        filter: &LogFilter,
    ) -> Result<Vec<Exercise>, rusqlite::Error> {
        let mut query = Self::select_star();
        query.and_where(Expr::col(ExerciseIden::UserId).eq(user_id));

        if let Some(from) = filter.from {
            query.and_where(Expr::col(ExerciseIden::Date).gte(from));
        }
        if let Some(to) = filter.to {
            query.and_where(Expr::col(ExerciseIden::Date).lte(to));
        }

        query.order_by_expr(Expr::cust("rowid"), Order::Asc);

        if let Some(limit) = filter.limit {
            query.limit(limit);
        }

        let (sql, values) = query.build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let exercises = stmt
            .query_map(&*values.as_params(), Exercise::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(exercises)
    }

    pub fn create(conn: &mut Connection, new_exercise: NewExercise) -> Result<Exercise, rusqlite::Error> {
        let tx = conn.transaction()?;
        let exercise = {
            new_exercise.insert(&tx)?;
            Exercise::fetch_by_id(&tx, &new_exercise.id)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?
        };
        tx.commit()?;

        Ok(exercise)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::payloads::DurationInput;

    fn alice() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
        }
    }

    fn today() -> ExerciseDate {
        ExerciseDate::from_ymd(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_new_exercise_belongs_to_user() {
        let user = alice();
        let payload = AddExercise {
            description: Some("run".into()),
            duration: Some(30.into()),
            date: Some("2023-01-05".into()),
        };
        let exercise = NewExercise::new(&user, payload, today()).unwrap();
        assert_eq!(exercise.user_id, user.id);
        assert_eq!(exercise.duration, Some(30));
        assert_eq!(exercise.date(), ExerciseDate::from_ymd(2023, 1, 5).unwrap());
    }

    #[test]
    fn test_new_exercise_defaults_date() {
        let exercise = NewExercise::new(&alice(), AddExercise::default(), today()).unwrap();
        assert_eq!(exercise.date(), today());

        let payload = AddExercise {
            date: Some("someday".into()),
            ..Default::default()
        };
        let exercise = NewExercise::new(&alice(), payload, today()).unwrap();
        assert_eq!(exercise.date(), today());
    }

    #[test]
    fn test_new_exercise_rejects_bad_duration() {
        let payload = AddExercise {
            duration: Some(DurationInput::Text("half an hour".into())),
            ..Default::default()
        };
        assert_eq!(
            NewExercise::new(&alice(), payload, today()),
            Err(AddExerciseError::InvalidDuration {
                value: "half an hour".into()
            })
        );
    }
}

use axum::{extract::Path, Json};
use shared::{
    api::{
        error::{ServerError, ServerErrorContext},
        payloads::{AddExercise, UserExercise},
        response_errors::AddExerciseError,
    },
    model::{Exercise, NewExercise, User},
    types::ExerciseDate,
};
use tracing::{debug, instrument};

use crate::{db::DatabaseConnection, Payload};

#[instrument(skip(conn))]
pub async fn add_exercise(
    conn: DatabaseConnection,
    Path(id): Path<String>,
    Payload(payload): Payload<AddExercise>,
) -> Result<Json<UserExercise>, ServerError<AddExerciseError>> {
    let today = ExerciseDate::today();

    conn.run(move |conn| {
        let user = User::fetch_by_id_str(conn, &id)?
            .ok_or_else(|| AddExerciseError::UserNotFound { id: id.clone() })?;

        let exercise = Exercise::create(conn, NewExercise::new(&user, payload, today)?)?;
        debug!(exercise_id = %exercise.id, user_id = %user.id, date = %exercise.date, "Added exercise");

        Ok(UserExercise::new(&user, &exercise))
    })
    .await
    .context("Failed to save exercise")
    .map(Json)
}

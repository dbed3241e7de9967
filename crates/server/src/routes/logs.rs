use axum::{
    extract::{Path, Query},
    Json,
};
use shared::{
    api::{
        error::{ServerError, ServerErrorContext},
        payloads::{ExerciseLog, LogQuery},
        response_errors::LogError,
    },
    model::{Exercise, User},
};
use tracing::{debug, instrument};

use crate::db::DatabaseConnection;

#[instrument(skip(conn))]
pub async fn fetch_log(
    conn: DatabaseConnection,
    Path(id): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<ExerciseLog>, ServerError<LogError>> {
    let filter = query.filter();
    debug!(?filter);

    conn.run(move |conn| {
        let user = User::fetch_by_id_str(conn, &id)?
            .ok_or_else(|| LogError::UserNotFound { id: id.clone() })?;

        let exercises = Exercise::fetch_log(conn, &user.id, &filter)?;

        Ok(ExerciseLog::new(user, exercises))
    })
    .await
    .context("Failed to fetch exercise log")
    .map(Json)
}

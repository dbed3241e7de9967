use axum::Json;
use shared::{
    api::{
        error::{ServerError, ServerErrorContext},
        payloads::CreateUser,
        response_errors::{CreateUserError, ListUsersError},
    },
    model::{NewUser, User},
};
use tracing::{info, instrument};

use crate::{db::DatabaseConnection, Payload};

#[instrument(skip(conn))]
pub async fn create_user(
    conn: DatabaseConnection,
    Payload(payload): Payload<CreateUser>,
) -> Result<Json<User>, ServerError<CreateUserError>> {
    let new_user = NewUser::try_from(payload)?;

    conn.run(move |conn| {
        let user = User::create(conn, new_user)?;
        info!(id = %user.id, username = %user.username, "Created user");
        Ok(user)
    })
    .await
    .context("Failed to save user")
    .map(Json)
}

#[instrument(skip(conn))]
pub async fn list_users(
    conn: DatabaseConnection,
) -> Result<Json<Vec<User>>, ServerError<ListUsersError>> {
    conn.run(|conn| Ok(User::fetch_all(conn)?))
        .await
        .context("Failed to fetch users")
        .map(Json)
}

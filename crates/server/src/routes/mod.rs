use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use deadpool_sqlite::Pool;
use shared::api::Object;

mod users;
pub use users::*;

mod exercises;
pub use exercises::*;

mod logs;
pub use logs::*;

/// The json api. Static assets are added on top of this by [`crate::app`]
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Pool: FromRef<S>,
{
    Router::new()
        .route(Object::Users.path(), post(create_user).get(list_users))
        .route(Object::UserExercises.path(), post(add_exercise))
        .route(Object::UserLogs.path(), get(fetch_log))
}

use std::ops::{Deref, DerefMut};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use deadpool_sqlite::{Object, Pool};
use rusqlite::Connection;
use shared::api::error::{Nothing, ServerError};

#[derive(Debug)]
pub struct DatabaseConnection(pub Object);

impl DatabaseConnection {
    /// Runs `f` on a blocking thread with the pooled connection. A failure to
    /// run the closure at all is reported as an internal error
    pub async fn run<F, R, E>(&self, f: F) -> Result<R, ServerError<E>>
    where
        F: FnOnce(&mut Connection) -> Result<R, ServerError<E>> + Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
    {
        self.0.interact(f).await?
    }
}

impl From<Object> for DatabaseConnection {
    fn from(conn: Object) -> Self {
        DatabaseConnection(conn)
    }
}

impl Deref for DatabaseConnection {
    type Target = Object;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DatabaseConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for DatabaseConnection
where
    S: Send + Sync,
    Pool: FromRef<S>,
{
    type Rejection = ServerError<Nothing>;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = Pool::from_ref(state);

        // Get connection from the pool
        let conn = pool.get().await?;

        Ok(conn.into())
    }
}

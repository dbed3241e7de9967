use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Inner error for routes that can only fail internally
#[derive(Debug, Clone, PartialEq)]
pub enum Nothing {}

impl fmt::Display for Nothing {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl std::error::Error for Nothing {}

/// Json body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    pub fn internal<S: Into<String>, E: Into<String>>(message: S, error: E) -> Self {
        Self {
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug)]
pub enum ServerError<T> {
    /// An expected failure, the status code is picked by the route error type
    Inner { code: StatusCode, inner: T },
    /// Anything unexpected. Always a 500
    Other { message: String },
    WithContext { context: String, inner: Box<Self> },
}

impl<T> ServerError<T> {
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    pub fn code(&self) -> StatusCode {
        match self {
            Self::Inner { code, .. } => *code,
            Self::Other { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::WithContext { inner, .. } => inner.code(),
        }
    }
}

impl<T: fmt::Display> ServerError<T> {
    /// Route errors are shown as is. Internal errors use the outermost context
    /// as the message and keep the root cause in `error`
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::Inner { inner, .. } => ErrorBody::new(inner.to_string()),
            Self::Other { message } => ErrorBody::internal("Something went wrong", message.clone()),
            Self::WithContext { context, inner } => match inner.body() {
                ErrorBody {
                    error: Some(error), ..
                } => ErrorBody::internal(context.clone(), error),
                body => body,
            },
        }
    }
}

impl<T: fmt::Display> fmt::Display for ServerError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner { code, inner } => write!(f, "{code}: {inner}"),
            Self::Other { message } => write!(f, "{message}"),
            Self::WithContext { context, inner } => write!(f, "{context}: {inner}"),
        }
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for ServerError<T> {}

pub trait ServerErrorContext<R, T> {
    /// Attach a message describing the failed operation
    fn context<S: Into<String>>(self, context: S) -> Result<R, ServerError<T>>;
}

impl<R, T> ServerErrorContext<R, T> for Result<R, ServerError<T>> {
    fn context<S: Into<String>>(self, context: S) -> Result<R, ServerError<T>> {
        self.map_err(|inner| ServerError::WithContext {
            context: context.into(),
            inner: Box::new(inner),
        })
    }
}

/// Build a `ServerError::Other` from a format string
#[macro_export]
macro_rules! other_error {
    ($($arg:tt)*) => {
        $crate::api::error::ServerError::Other { message: format!($($arg)*) }
    };
}

#[cfg(feature = "backend")]
mod backend {
    use axum::{
        response::{IntoResponse, Response},
        Json,
    };
    use deadpool_sqlite::{InteractError, PoolError};
    use std::fmt;
    use tracing::error;

    use super::ServerError;

    impl<T: fmt::Display> IntoResponse for ServerError<T> {
        fn into_response(self) -> Response {
            let code = self.code();
            if code.is_server_error() {
                error!(%code, "{self}");
            }
            (code, Json(self.body())).into_response()
        }
    }

    impl<T> From<rusqlite::Error> for ServerError<T> {
        fn from(err: rusqlite::Error) -> Self {
            Self::other(err.to_string())
        }
    }

    impl<T> From<InteractError> for ServerError<T> {
        fn from(err: InteractError) -> Self {
            Self::other(format!("Database task failed: {err}"))
        }
    }

    impl<T> From<PoolError> for ServerError<T> {
        fn from(err: PoolError) -> Self {
            Self::other(format!("Database connection unavailable: {err}"))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::response_errors::CreateUserError;

    #[test]
    fn test_inner_error_body_uses_route_message() {
        let err: ServerError<CreateUserError> = CreateUserError::UsernameMissing.into();
        let err = Err::<(), _>(err).context("Failed to save user").unwrap_err();
        assert_eq!(err.code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), ErrorBody::new("The 'username' field is required"));
    }

    #[test]
    fn test_other_error_body_uses_outer_context() {
        let err = Err::<(), ServerError<Nothing>>(ServerError::other("disk I/O error"))
            .context("Failed to fetch users")
            .unwrap_err();
        assert_eq!(err.code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.body(),
            ErrorBody::internal("Failed to fetch users", "disk I/O error")
        );
    }

    #[test]
    fn test_error_body_omits_missing_error() {
        let json = serde_json::to_string(&ErrorBody::new("nope")).unwrap();
        assert_eq!(json, r#"{"message":"nope"}"#);
    }
}

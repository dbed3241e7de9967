use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::{Nothing, ServerError};

macro_rules! response_error {
    ($name:ident {
        $(
            #[code($variant_code:expr)]
            #[error($($message:tt)*)]
            $variant:ident
            $({ $($var_struct_body_tt:tt)* })?
        ,)*
    }) => {

        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
        pub enum $name {
            $(
                #[error($($message)*)]
                $variant $({
                    $($var_struct_body_tt)*
                })?,
            )*
        }

        impl $name {
            pub fn code(&self) -> StatusCode {
                match self {
                    $( $name::$variant { .. } => $variant_code, )*
                }
            }
        }

        impl From<$name> for ServerError<$name> {
            fn from(inner: $name) -> Self {
                let code = inner.code();
                Self::Inner { code, inner }
            }
        }
    };
}

response_error!(CreateUserError {
    #[code(StatusCode::BAD_REQUEST)]
    #[error("The 'username' field is required")]
    UsernameMissing,
});

// Alias used to allow future expansion of the errors without having to go back
// and update all routes that use it
pub type ListUsersError = Nothing;

response_error!(AddExerciseError {
    #[code(StatusCode::NOT_FOUND)]
    #[error("User {id} not found")]
    UserNotFound { id: String },
    #[code(StatusCode::BAD_REQUEST)]
    #[error("The 'duration' field must be a whole number of minutes, got {value:?}")]
    InvalidDuration { value: String },
});

response_error!(LogError {
    #[code(StatusCode::NOT_FOUND)]
    #[error("User {id} not found")]
    UserNotFound { id: String },
});

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CreateUserError::UsernameMissing.code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AddExerciseError::UserNotFound { id: "x".into() }.code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AddExerciseError::InvalidDuration { value: "soon".into() }.code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            LogError::UserNotFound { id: "abc".into() }.to_string(),
            "User abc not found"
        );
        assert_eq!(
            AddExerciseError::InvalidDuration { value: "soon".into() }.to_string(),
            "The 'duration' field must be a whole number of minutes, got \"soon\""
        );
    }
}

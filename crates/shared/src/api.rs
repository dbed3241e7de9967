use const_format::concatcp;
pub mod error;
pub mod payloads;
pub mod response_errors;

pub const API_BASE_PATH: &str = "/api/";

/// Placeholder used in route templates for the user id path segment
pub const ID_PLACEHOLDER: &str = ":id";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Object {
    Users,
    UserExercises,
    UserLogs,
}

impl Object {
    /// Route template, as registered with the router
    pub const fn path(&self) -> &str {
        use Object::*;
        match self {
            Users => concatcp!(API_BASE_PATH, "users"),
            UserExercises => concatcp!(API_BASE_PATH, "users/", ID_PLACEHOLDER, "/exercises"),
            UserLogs => concatcp!(API_BASE_PATH, "users/", ID_PLACEHOLDER, "/logs"),
        }
    }

    /// Concrete url with the id placeholder filled in
    pub fn path_for<T: std::fmt::Display>(&self, id: T) -> String {
        self.path().replace(ID_PLACEHOLDER, &id.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Object::Users.path(), "/api/users");
        assert_eq!(Object::UserExercises.path(), "/api/users/:id/exercises");
        assert_eq!(Object::UserLogs.path_for("abc"), "/api/users/abc/logs");
    }
}

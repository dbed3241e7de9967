use serde::{Deserialize, Serialize};

use crate::{
    api::{payloads::CreateUser, response_errors::CreateUserError},
    types::Uuid,
};

#[cfg(feature = "backend")]
use {
    exemplar::Model,
    rusqlite::{Connection, OptionalExtension},
    sea_query::{enum_def, Expr, Order, Query, SelectStatement, SqliteQueryBuilder},
    sea_query_rusqlite::RusqliteBinder,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "backend", derive(Model))]
#[cfg_attr(feature = "backend", table("user"))]
#[cfg_attr(feature = "backend", enum_def)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

/// A user that hasn't been stored yet. Only constructable with a username
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "backend", derive(Model))]
#[cfg_attr(feature = "backend", table("user"))]
pub struct NewUser {
    id: Uuid,
    username: String,
}

impl NewUser {
    pub fn new<T: Into<String>>(username: T) -> Result<Self, CreateUserError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(CreateUserError::UsernameMissing);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            username,
        })
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl TryFrom<CreateUser> for NewUser {
    type Error = CreateUserError;

    fn try_from(payload: CreateUser) -> Result<Self, Self::Error> {
        let username = payload.username.ok_or(CreateUserError::UsernameMissing)?;
        Self::new(username)
    }
}

#[cfg(feature = "backend")]
impl User {
    fn select_star() -> SelectStatement {
        Query::select()
            .columns([UserIden::Id, UserIden::Username])
            .from(UserIden::Table)
            .to_owned()
    }

    pub fn fetch_by_id(conn: &Connection, id: &Uuid) -> Result<Option<User>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(UserIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let user = stmt.query_row(&*values.as_params(), User::from_row).optional()?;
        Ok(user)
    }

    /// Looks up a user from an id taken from a url. Ids that don't parse
    /// can't belong to anyone so they're treated as missing
    pub fn fetch_by_id_str(conn: &Connection, id: &str) -> Result<Option<User>, rusqlite::Error> {
        match Uuid::parse(id) {
            Ok(id) => Self::fetch_by_id(conn, &id),
            Err(_) => Ok(None),
        }
    }

    /// All users in insertion order
    pub fn fetch_all(conn: &Connection) -> Result<Vec<User>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .order_by_expr(Expr::cust("rowid"), Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let users = stmt
            .query_map(&*values.as_params(), User::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(users)
    }

    pub fn create(conn: &mut Connection, new_user: NewUser) -> Result<User, rusqlite::Error> {
        let tx = conn.transaction()?;
        let user = {
            new_user.insert(&tx)?;
            User::fetch_by_id(&tx, &new_user.id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?
        };
        tx.commit()?;

        Ok(user)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_user_requires_username() {
        assert_eq!(NewUser::new(""), Err(CreateUserError::UsernameMissing));
        assert_eq!(NewUser::new("  \t"), Err(CreateUserError::UsernameMissing));
        assert_eq!(
            NewUser::try_from(CreateUser::default()),
            Err(CreateUserError::UsernameMissing)
        );
    }

    #[test]
    fn test_new_user_ids_are_unique() {
        let a = NewUser::new("alice").unwrap();
        let b = NewUser::new("alice").unwrap();
        assert_eq!(a.username(), "alice");
        assert_ne!(a.id(), b.id());
    }
}

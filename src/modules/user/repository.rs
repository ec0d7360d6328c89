use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "OWNER")]
    Owner,
    #[serde(rename = "CLIENT")]
    Client,
    #[serde(rename = "DELIVERY")]
    Delivery,
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_ref() {
            "OWNER" => Ok(Role::Owner),
            "CLIENT" => Ok(Role::Client),
            "DELIVERY" => Ok(Role::Delivery),
            role => Err(format!("Invalid user role: {}", role)),
        }
    }
}

impl ToString for Role {
    fn to_string(&self) -> String {
        match self {
            Role::Owner => String::from("OWNER"),
            Role::Client => String::from("CLIENT"),
            Role::Delivery => String::from("DELIVERY"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    // Password hash stays at rest; it must never show up in a response body.
    #[serde(skip_serializing)]
    pub password: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_verified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateUserPayload {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug)]
pub enum Error {
    DuplicateEmail,
    UnexpectedError,
}

pub async fn create<'e, E>(e: E, payload: CreateUserPayload) -> Result<User>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        "
        INSERT INTO users (id, email, password, role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.email)
    .bind(payload.password)
    .bind(payload.role.to_string())
    .fetch_one(e)
    .await
    .map_err(|err| {
        if err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            return Error::DuplicateEmail;
        }
        tracing::error!("Error occurred while creating a user account: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching user with id {}: {}", id, err);
            Error::UnexpectedError
        })
}

pub async fn find_by_email<'e, E: PgExecutor<'e>>(e: E, email: String) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching user by email: {}", err);
            Error::UnexpectedError
        })
}

#[derive(Default)]
pub struct UpdateUserPayload {
    pub email: Option<String>,
    // Already hashed by the caller; this repository never sees raw passwords.
    pub password: Option<String>,
    pub is_verified: Option<bool>,
}

pub async fn update_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    payload: UpdateUserPayload,
) -> Result<()> {
    sqlx::query(
        "
        UPDATE users SET
            email = COALESCE($1, email),
            password = COALESCE($2, password),
            is_verified = COALESCE($3, is_verified),
            updated_at = NOW()
        WHERE
            id = $4
        ",
    )
    .bind(payload.email)
    .bind(payload.password)
    .bind(payload.is_verified)
    .bind(id.clone())
    .execute(e)
    .await
    .map_err(|err| {
        if err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            return Error::DuplicateEmail;
        }
        tracing::error!("Error occurred while updating user with id {}: {}", id, err);
        Error::UnexpectedError
    })
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_wire_form() {
        for role in [Role::Owner, Role::Client, Role::Delivery] {
            assert_eq!(Role::try_from(role.to_string()), Ok(role));
        }
        assert!(Role::try_from("ADMIN".to_string()).is_err());
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: "01J6KWPJ4V4V4V4V4V4V4V4V4V".to_string(),
            email: "owner@example.com".to_string(),
            password: "$argon2id$secret".to_string(),
            role: Role::Owner,
            is_verified: true,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2id"));
    }
}

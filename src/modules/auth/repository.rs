use chrono::{NaiveDateTime, Utc};
use sqlx::PgExecutor;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

/// A session row; its id doubles as the bearer access token.
#[derive(Clone, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub expires_at: NaiveDateTime,
}

const SESSION_LIFETIME_DAYS: i64 = 7;

pub async fn create_session<'e, E: PgExecutor<'e>>(e: E, user_id: String) -> Result<Session> {
    sqlx::query_as::<_, Session>(
        "INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Ulid::new().to_string())
    .bind(user_id.clone())
    .bind(Utc::now().naive_utc() + chrono::Duration::days(SESSION_LIFETIME_DAYS))
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while creating a session for user with id {}: {}",
            user_id,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn find_session_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Session>> {
    sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching session with id {}: {}", id, err);
            Error::UnexpectedError
        })
}

/// Deletes every session whose lifetime has lapsed, returning the number of
/// rows removed.
pub async fn delete_expired_sessions<'e, E: PgExecutor<'e>>(
    e: E,
    now: NaiveDateTime,
) -> Result<u64> {
    sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
        .bind(now)
        .execute(e)
        .await
        .map(|result| result.rows_affected())
        .map_err(|err| {
            tracing::error!("Error occurred while deleting expired sessions: {}", err);
            Error::UnexpectedError
        })
}

#[derive(Clone, sqlx::FromRow)]
pub struct Verification {
    pub id: String,
    pub code: String,
    pub user_id: String,
    pub created_at: NaiveDateTime,
}

/// Creates a verification row for the user, replacing the previous code if
/// one is still pending.
pub async fn create_verification<'e, E: PgExecutor<'e>>(
    e: E,
    user_id: String,
) -> Result<Verification> {
    sqlx::query_as::<_, Verification>(
        "
        INSERT INTO verifications (id, code, user_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE SET code = EXCLUDED.code, created_at = NOW()
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(Ulid::new().to_string())
    .bind(user_id.clone())
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while creating a verification for user with id {}: {}",
            user_id,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn find_verification_by_code<'e, E: PgExecutor<'e>>(
    e: E,
    code: String,
) -> Result<Option<Verification>> {
    sqlx::query_as::<_, Verification>("SELECT * FROM verifications WHERE code = $1")
        .bind(code)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching verification by code: {}", err);
            Error::UnexpectedError
        })
}

pub async fn delete_verification_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<()> {
    sqlx::query("DELETE FROM verifications WHERE id = $1")
        .bind(id.clone())
        .execute(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while deleting verification with id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
        .map(|_| ())
}

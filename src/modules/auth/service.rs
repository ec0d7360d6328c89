use super::repository::{self, Session};
use crate::{
    modules::user::repository::User,
    types,
    utils::mail::{self, EmailVar},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use std::sync::Arc;

pub enum Error {
    UnexpectedError,
    InvalidSession,
}

type Result<T> = std::result::Result<T, Error>;

pub fn hash_password(raw_password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw_password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!("Failed to hash password: {}", err);
            Error::UnexpectedError
        })
}

pub fn verify_password(raw_password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(raw_password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub async fn create_session(ctx: Arc<types::Context>, user_id: String) -> Result<Session> {
    repository::create_session(&ctx.db_conn.pool, user_id)
        .await
        .map_err(|_| Error::UnexpectedError)
}

pub async fn verify_access_token(ctx: Arc<types::Context>, access_token: String) -> Result<Session> {
    let session = repository::find_session_by_id(&ctx.db_conn.pool, access_token)
        .await
        .map_err(|_| Error::UnexpectedError)?
        .ok_or(Error::InvalidSession)?;

    if session.expires_at < Utc::now().naive_utc() {
        return Err(Error::InvalidSession);
    }

    Ok(session)
}

/// Issues a fresh verification code for the user and mails it, without
/// blocking the enclosing request. Mail failures are logged downstream and
/// never reach the caller.
pub async fn send_verification_email(ctx: Arc<types::Context>, user: User) {
    let verification = match repository::create_verification(&ctx.db_conn.pool, user.id.clone())
        .await
    {
        Ok(verification) => verification,
        Err(_) => return,
    };

    tokio::spawn(async move {
        let _ = mail::send(
            ctx.mail.clone(),
            String::from("Verify Your Email"),
            String::from("id-verification"),
            user.email.clone(),
            vec![
                EmailVar {
                    key: String::from("code"),
                    value: verification.code,
                },
                EmailVar {
                    key: String::from("username"),
                    value: user.email,
                },
            ],
        )
        .await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("hunter2").ok().unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn hashing_is_salted() {
        let first = hash_password("hunter2").ok().unwrap();
        let second = hash_password("hunter2").ok().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }
}

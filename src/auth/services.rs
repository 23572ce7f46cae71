//! Identity store: registration, credential checks and lookups.

use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::{
    password::{hash_password, verify_password},
    repo_types::{User, UserId},
};
use crate::error::AppError;

const MAX_USERNAME_CHARS: usize = 80;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub async fn register(
    db: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let username = username.trim();
    let email = email.trim().to_lowercase();

    if username.is_empty() || username.chars().count() > MAX_USERNAME_CHARS {
        return Err(AppError::Validation(format!(
            "username must be 1 to {} characters",
            MAX_USERNAME_CHARS
        )));
    }
    if !is_valid_email(&email) {
        return Err(AppError::Validation("invalid email".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("password must not be empty".into()));
    }

    if User::find_by_username(db, username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(AppError::Conflict("username"));
    }
    if User::find_by_email(db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("email"));
    }

    let hash = hash_password(password)?;

    // The pre-checks race with concurrent registrations; the unique indexes decide.
    let user = match User::create(db, username, &email, &hash).await {
        Ok(u) => u,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(%username, "registration lost a uniqueness race");
            return Err(AppError::Conflict("username or email"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

pub async fn authenticate(db: &SqlitePool, username: &str, password: &str) -> Result<User, AppError> {
    let username = username.trim();
    let Some(user) = User::find_by_username(db, username).await? else {
        warn!(%username, "login unknown username");
        return Err(AppError::AuthFailure);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::AuthFailure);
    }

    info!(user_id = user.id, "user authenticated");
    Ok(user)
}

pub async fn get_user(db: &SqlitePool, id: UserId) -> Result<User, AppError> {
    User::find_by_id(db, id)
        .await?
        .ok_or(AppError::NotFound("user"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("al ice@example.com"));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts_and_first_user_survives() {
        let db = db::in_memory().await.unwrap();
        let alice = register(&db, "alice", "alice@example.com", "pw-one")
            .await
            .unwrap();

        let err = register(&db, "alice", "other@example.com", "pw-two")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict("username")));

        let fetched = get_user(&db, alice.id).await.unwrap();
        assert_eq!(fetched.username, "alice");
        let authed = authenticate(&db, "alice", "pw-one").await.unwrap();
        assert_eq!(authed.id, alice.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let db = db::in_memory().await.unwrap();
        register(&db, "alice", "shared@example.com", "pw").await.unwrap();
        let err = register(&db, "bob", "Shared@Example.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict("email")));
    }

    #[tokio::test]
    async fn wrong_password_always_fails() {
        let db = db::in_memory().await.unwrap();
        register(&db, "alice", "alice@example.com", "correct horse")
            .await
            .unwrap();

        let long = "x".repeat(4096);
        for wrong in ["", "c", "correct hors", "correct horse ", "CORRECT HORSE", long.as_str()] {
            let err = authenticate(&db, "alice", wrong).await.unwrap_err();
            assert!(matches!(err, AppError::AuthFailure), "{:?}", wrong);
        }
    }

    #[tokio::test]
    async fn unknown_user_fails_authentication() {
        let db = db::in_memory().await.unwrap();
        let err = authenticate(&db, "ghost", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::AuthFailure));
    }

    #[tokio::test]
    async fn password_is_stored_hashed() {
        let db = db::in_memory().await.unwrap();
        let user = register(&db, "alice", "alice@example.com", "plaintext-pw")
            .await
            .unwrap();
        assert_ne!(user.password_hash, "plaintext-pw");
        assert!(!user.password_hash.contains("plaintext-pw"));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let db = db::in_memory().await.unwrap();
        let cases = [
            ("", "a@b.cd", "pw"),
            ("   ", "a@b.cd", "pw"),
            ("alice", "nope", "pw"),
            ("alice", "a@b.cd", ""),
        ];
        for (u, e, p) in cases {
            let err = register(&db, u, e, p).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{:?}", (u, e, p));
        }
        let too_long = "a".repeat(MAX_USERNAME_CHARS + 1);
        assert!(register(&db, &too_long, "a@b.cd", "pw").await.is_err());
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let db = db::in_memory().await.unwrap();
        assert!(matches!(
            get_user(&db, 999).await.unwrap_err(),
            AppError::NotFound("user")
        ));
    }
}

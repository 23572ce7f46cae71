use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{claims::TokenKind, jwt::JwtKeys, repo_types::UserId};
use crate::{
    access::{require_authenticated, Actor},
    error::AppError,
};

/// Resolves the request's actor from an optional `Authorization: Bearer` access token.
///
/// No header means [`Actor::Anonymous`]; a header that does not carry a valid
/// access token is rejected rather than downgraded.
#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
            return Ok(Actor::Anonymous);
        };
        let auth_header = auth_header.to_str().map_err(|_| AppError::AuthRequired)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(AppError::AuthRequired)?;

        let keys = JwtKeys::from_ref(state);
        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err(AppError::AuthRequired);
            }
        };

        if claims.kind != TokenKind::Access {
            warn!(user_id = claims.sub, "refresh token used as access token");
            return Err(AppError::AuthRequired);
        }

        Ok(Actor::User(claims.sub))
    }
}

/// An authenticated user; anonymous requests are rejected.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = Actor::from_request_parts(parts, state).await?;
        require_authenticated(actor).map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::http::Request;

    #[derive(Clone)]
    struct KeysOnly(JwtKeys);

    impl FromRef<KeysOnly> for JwtKeys {
        fn from_ref(s: &KeysOnly) -> Self {
            s.0.clone()
        }
    }

    fn state() -> KeysOnly {
        KeysOnly(JwtKeys::from_config(&JwtConfig {
            secret: "s".into(),
            issuer: "i".into(),
            audience: "a".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        }))
    }

    fn parts(auth: Option<&str>) -> Parts {
        let mut req = Request::builder().uri("/");
        if let Some(v) = auth {
            req = req.header("authorization", v);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_anonymous() {
        let st = state();
        let actor = Actor::from_request_parts(&mut parts(None), &st).await.unwrap();
        assert_eq!(actor, Actor::Anonymous);

        let err = AuthUser::from_request_parts(&mut parts(None), &st)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthRequired));
    }

    #[tokio::test]
    async fn access_token_resolves_user() {
        let st = state();
        let token = st.0.sign_access(9).unwrap();
        let header = format!("Bearer {}", token);
        let AuthUser(id) = AuthUser::from_request_parts(&mut parts(Some(&header)), &st)
            .await
            .unwrap();
        assert_eq!(id, 9);
    }

    #[tokio::test]
    async fn refresh_token_and_garbage_are_rejected() {
        let st = state();
        let refresh = format!("Bearer {}", st.0.sign_refresh(9).unwrap());
        for header in [refresh.as_str(), "Bearer nope", "Basic abc"] {
            let err = Actor::from_request_parts(&mut parts(Some(header)), &st)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::AuthRequired), "{}", header);
        }
    }
}

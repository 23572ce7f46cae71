//! Authorization checks shared by every mutating operation.
//!
//! Ownership is the only capability there is: a user may manage a project
//! iff they created it. Starring deliberately bypasses both checks.

use crate::{auth::repo_types::UserId, error::AppError, projects::repo_types::Project};

/// Who is making the request, as resolved by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(UserId),
}

impl Actor {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Actor::User(id) => Some(*id),
            Actor::Anonymous => None,
        }
    }
}

pub fn can_manage(actor: UserId, project: &Project) -> bool {
    actor == project.owner_id
}

pub fn require_authenticated(actor: Actor) -> Result<UserId, AppError> {
    actor.user_id().ok_or(AppError::AuthRequired)
}

pub fn require_manage(actor: UserId, project: &Project) -> Result<(), AppError> {
    if can_manage(actor, project) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn project_owned_by(owner_id: UserId) -> Project {
        Project {
            id: 1,
            title: "demo".into(),
            description: "d".into(),
            repository_url: None,
            languages: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
            owner_id,
            stars: 0,
            folder_token: "tok".into(),
        }
    }

    #[test]
    fn only_the_owner_can_manage() {
        let project = project_owned_by(7);
        assert!(can_manage(7, &project));
        assert!(!can_manage(8, &project));
        assert!(require_manage(7, &project).is_ok());
        assert!(matches!(require_manage(8, &project), Err(AppError::Forbidden)));
    }

    #[test]
    fn anonymous_actor_is_not_authenticated() {
        assert!(matches!(
            require_authenticated(Actor::Anonymous),
            Err(AppError::AuthRequired)
        ));
        assert_eq!(require_authenticated(Actor::User(3)).unwrap(), 3);
    }
}

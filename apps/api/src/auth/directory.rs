use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{CurrentUser, UserRow};

/// Lookup of users and their group memberships.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolves an unexpired session token to an active user.
    async fn find_by_token(&self, token: &str) -> Result<Option<CurrentUser>, AppError>;

    async fn exists(&self, user_id: Uuid) -> Result<bool, AppError>;
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_token(&self, token: &str) -> Result<Option<CurrentUser>, AppError> {
        let user: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT u.*
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > now() AND u.is_active
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            return Ok(None);
        };

        let groups: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT g.name
            FROM user_groups ug
            JOIN groups g ON g.id = ug.group_id
            WHERE ug.user_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        let permissions: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT codename FROM user_permissions WHERE user_id = $1
            UNION
            SELECT gp.codename
            FROM group_permissions gp
            JOIN user_groups ug ON ug.group_id = gp.group_id
            WHERE ug.user_id = $1
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(CurrentUser {
            id: user.id,
            username: user.username,
            is_superuser: user.is_superuser,
            groups,
            permissions: permissions.into_iter().collect::<BTreeSet<_>>(),
        }))
    }

    async fn exists(&self, user_id: Uuid) -> Result<bool, AppError> {
        Ok(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;

    /// Token → user table for HTTP tests.
    #[derive(Default)]
    pub struct MemoryUserDirectory {
        users: Vec<(String, CurrentUser)>,
    }

    impl MemoryUserDirectory {
        pub fn with_session(mut self, token: &str, user: CurrentUser) -> Self {
            self.users.push((token.to_string(), user));
            self
        }
    }

    #[async_trait]
    impl UserDirectory for MemoryUserDirectory {
        async fn find_by_token(&self, token: &str) -> Result<Option<CurrentUser>, AppError> {
            Ok(self
                .users
                .iter()
                .find(|(t, _)| t == token)
                .map(|(_, u)| u.clone()))
        }

        async fn exists(&self, user_id: Uuid) -> Result<bool, AppError> {
            Ok(self.users.iter().any(|(_, u)| u.id == user_id))
        }
    }
}

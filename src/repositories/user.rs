//! # User Repository

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::user::{self, Role};
use crate::models::User;

/// Fields of a user about to be stored; `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Repository for user database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lookup by email; callers pass the normalized (trimmed, lowercased) form.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, RepositoryError> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create(&self, new_user: NewUser) -> Result<user::Model, RepositoryError> {
        let now = Utc::now().fixed_offset();

        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            password: Set(new_user.password_hash),
            role: Set(new_user.role.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }
}

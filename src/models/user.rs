//! User entity model
//!
//! This module contains the SeaORM entity model for the users table.
//! The password column only ever holds a bcrypt hash.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

/// User entity representing an account able to sign in
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Login email (unique, lowercased)
    #[sea_orm(unique)]
    pub email: String,

    /// bcrypt password hash
    pub password: String,

    /// Role name, see [`Role`]
    pub role: String,

    /// Timestamp when the user was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the user was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parsed role of the user; unknown values are treated as [`Role::User`].
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }
}

/// Account role carried in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "ADMIN" => Role::Admin,
            _ => Role::User,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_column_value() {
        assert_eq!(Role::parse(Role::Admin.as_str()), Role::Admin);
        assert_eq!(Role::parse(Role::User.as_str()), Role::User);
    }

    #[test]
    fn unknown_role_is_not_admin() {
        assert_eq!(Role::parse("admin"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }
}

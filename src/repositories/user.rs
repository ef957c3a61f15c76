//! # User Repository
//!
//! Back-office accounts and the `authenticate_user` check used by login.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::RepositoryError;
use crate::models::user::{ActiveModel as UserActiveModel, Column, Entity as User, Model as UserModel};

pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(Column::Username.eq(username))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Returns the user when `password` matches the stored hash. Unknown
    /// users and wrong passwords both yield `None`.
    pub async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        let Some(user) = self.find_by_username(username.trim()).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Creates the account, or resets name and password when it exists.
    pub async fn upsert(
        &self,
        username: &str,
        name: &str,
        password: &str,
    ) -> Result<UserModel, RepositoryError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(RepositoryError::validation_error("username is required"));
        }
        if password.len() < 8 {
            return Err(RepositoryError::validation_error(
                "password must have at least 8 characters",
            ));
        }

        let password_hash = hash_password(password)
            .map_err(|e| RepositoryError::validation_error(e.to_string()))?;

        match self.find_by_username(username).await? {
            Some(existing) => {
                let mut user = existing.into_active_model();
                user.name = Set(name.to_string());
                user.password_hash = Set(password_hash);
                user.update(self.db)
                    .await
                    .map_err(RepositoryError::database_error)
            }
            None => UserActiveModel {
                id: Set(Uuid::new_v4()),
                username: Set(username.to_string()),
                name: Set(name.to_string()),
                password_hash: Set(password_hash),
                data_criacao: Set(Utc::now().into()),
            }
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error),
        }
    }
}

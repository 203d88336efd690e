use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::errors::IdentityError;
use crate::types::db::{photo, role, user};

/// Fields required to insert a new user row
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    /// Already normalized (trimmed, lowercased)
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role_id: String,
}

/// Partial profile update; unset fields are left untouched
#[derive(Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the stored number
    pub phone: Option<Option<String>>,
}

/// UserStore owns all persisted user, role and photo records
///
/// The identity service never touches entities directly; everything goes
/// through this store.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create a new UserStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Look up a user by normalized email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, IdentityError> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| IdentityError::database("find_user_by_email", e))
    }

    /// Look up a user by id
    pub async fn find_by_id(&self, id: &str) -> Result<Option<user::Model>, IdentityError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| IdentityError::database("find_user_by_id", e))
    }

    /// Insert a new user row
    ///
    /// The storage-level unique constraint on email is the final backstop
    /// against registration races; violations map to `EmailAlreadyExists`.
    pub async fn create_user(&self, fields: NewUser) -> Result<user::Model, IdentityError> {
        let now = Utc::now().timestamp();
        let email = fields.email.clone();

        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            first_name: Set(fields.first_name),
            last_name: Set(fields.last_name),
            email: Set(fields.email),
            phone: Set(fields.phone),
            password_hash: Set(fields.password_hash),
            is_active: Set(false),
            role_id: Set(fields.role_id),
            verification_code_hash: Set(None),
            code_expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        new_user.insert(&self.db).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") {
                IdentityError::EmailAlreadyExists(email)
            } else {
                IdentityError::database("create_user", e)
            }
        })
    }

    /// Mark a user as activated
    pub async fn set_active(&self, user_id: &str) -> Result<user::Model, IdentityError> {
        let update = user::ActiveModel {
            id: Set(user_id.to_string()),
            is_active: Set(true),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        update
            .update(&self.db)
            .await
            .map_err(|e| IdentityError::database("set_active", e))
    }

    /// Store a pending verification code, overwriting any previous one
    pub async fn set_verification_code(
        &self,
        user_id: &str,
        code_hash: String,
        expires_at: i64,
    ) -> Result<(), IdentityError> {
        let update = user::ActiveModel {
            id: Set(user_id.to_string()),
            verification_code_hash: Set(Some(code_hash)),
            code_expires_at: Set(Some(expires_at)),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        update
            .update(&self.db)
            .await
            .map_err(|e| IdentityError::database("set_verification_code", e))?;

        Ok(())
    }

    /// Clear the pending verification code
    pub async fn clear_verification_code(&self, user_id: &str) -> Result<(), IdentityError> {
        let update = user::ActiveModel {
            id: Set(user_id.to_string()),
            verification_code_hash: Set(None),
            code_expires_at: Set(None),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        update
            .update(&self.db)
            .await
            .map_err(|e| IdentityError::database("clear_verification_code", e))?;

        Ok(())
    }

    /// Merge supplied profile fields into the user row
    pub async fn update_profile(
        &self,
        user_id: &str,
        changes: ProfileUpdate,
    ) -> Result<user::Model, IdentityError> {
        let mut update = user::ActiveModel {
            id: Set(user_id.to_string()),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(first_name) = changes.first_name {
            update.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            update.last_name = Set(last_name);
        }
        if let Some(phone) = changes.phone {
            update.phone = Set(phone);
        }

        update
            .update(&self.db)
            .await
            .map_err(|e| IdentityError::database("update_profile", e))
    }

    /// Resolve a role by slug, creating it when missing
    ///
    /// Self-healing bootstrap: the default role does not have to be seeded.
    pub async fn find_or_create_role(
        &self,
        slug: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<role::Model, IdentityError> {
        let existing = role::Entity::find()
            .filter(role::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| IdentityError::database("find_role_by_slug", e))?;

        if let Some(role) = existing {
            return Ok(role);
        }

        let new_role = role::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            description: Set(description.map(|d| d.to_string())),
            created_at: Set(Utc::now().timestamp()),
        };

        new_role
            .insert(&self.db)
            .await
            .map_err(|e| IdentityError::database("create_role", e))
    }

    /// Load the role a user references; missing rows are a data-integrity error
    pub async fn role_by_id(&self, role_id: &str) -> Result<role::Model, IdentityError> {
        role::Entity::find_by_id(role_id)
            .one(&self.db)
            .await
            .map_err(|e| IdentityError::database("find_role_by_id", e))?
            .ok_or_else(|| {
                IdentityError::database(
                    "find_role_by_id",
                    DbErr::RecordNotFound(format!("role {}", role_id)),
                )
            })
    }

    /// Load a user's profile photo record, if any
    pub async fn find_photo(&self, user_id: &str) -> Result<Option<photo::Model>, IdentityError> {
        photo::Entity::find()
            .filter(photo::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| IdentityError::database("find_photo", e))
    }

    /// Create or replace a user's profile photo record
    pub async fn upsert_photo(
        &self,
        user_id: &str,
        path: &str,
    ) -> Result<photo::Model, IdentityError> {
        let now = Utc::now().timestamp();

        match self.find_photo(user_id).await? {
            Some(existing) => {
                let update = photo::ActiveModel {
                    id: Set(existing.id),
                    path: Set(path.to_string()),
                    updated_at: Set(now),
                    ..Default::default()
                };

                update
                    .update(&self.db)
                    .await
                    .map_err(|e| IdentityError::database("update_photo", e))
            }
            None => {
                let new_photo = photo::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    user_id: Set(user_id.to_string()),
                    path: Set(path.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                new_photo
                    .insert(&self.db)
                    .await
                    .map_err(|e| IdentityError::database("create_photo", e))
            }
        }
    }
}

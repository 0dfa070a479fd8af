use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Dni;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, UserError> {
        self.password_hasher
            .hash(password)
            .map_err(|e| UserError::Password(e.into()))
    }

    /// Fail when `dni` is registered to any user other than `owner`.
    async fn ensure_dni_available(
        &self,
        dni: &Dni,
        owner: Option<&UserId>,
    ) -> Result<(), UserError> {
        match self.repository.find_by_dni(dni).await? {
            Some(existing) if Some(&existing.id) != owner => {
                tracing::warn!(dni = %dni, "DNI already registered");
                Err(UserError::DniAlreadyExists(dni.to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        self.ensure_dni_available(&command.dni, None).await?;
        let password_hash = self.hash_password(&command.password)?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            name: command.name,
            lastname: command.lastname,
            birthday: command.birthday,
            dni: command.dni,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User created"
        );

        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self, page: &PageRequest) -> Result<Vec<User>, UserError> {
        self.repository.list_page(page).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(name) = command.name {
            user.name = name;
        }

        if let Some(lastname) = command.lastname {
            user.lastname = lastname;
        }

        if let Some(birthday) = command.birthday {
            user.birthday = birthday;
        }

        if let Some(dni) = command.dni {
            self.ensure_dni_available(&dni, Some(&user.id)).await?;
            user.dni = dni;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(&new_password)?;
        }

        let updated_user = self.repository.update(user).await?;
        tracing::info!(user_id = %updated_user.id, "User updated");

        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }
}

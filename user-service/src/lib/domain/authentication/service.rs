use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::AccessToken;
use crate::domain::authentication::ports::AuthServicePort;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;

/// Authentication service backed by the user directory.
///
/// Stateless: every login and every authorization check reads the
/// directory afresh.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `repository` - Directory the credentials and identities live in
    /// * `authenticator` - Password verifier and token signer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn find_user(&self, username: &Username) -> Result<Option<User>, AuthError> {
        self.repository
            .find_by_username(username)
            .await
            .map_err(|e| {
                tracing::error!(username = %username, error = %e, "Directory lookup failed");
                AuthError::Directory(e.to_string())
            })
    }

    fn reject_unknown(&self, password: &str) -> AuthError {
        self.authenticator.reject_unknown(password);
        AuthError::InvalidCredentials
    }

    fn issue_for(&self, user: &User) -> Result<AccessToken, AuthError> {
        self.authenticator
            .issue_token(Claims::for_subject(user.username.as_str()))
            .map(AccessToken::from)
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        let Ok(username) = Username::new(username.to_string()) else {
            tracing::warn!("Login rejected: malformed username");
            return Err(self.reject_unknown(password));
        };

        let Some(user) = self.find_user(&username).await? else {
            tracing::warn!(username = %username, "Login rejected: unknown user");
            return Err(self.reject_unknown(password));
        };

        let result = self
            .authenticator
            .authenticate(
                password,
                &user.password_hash,
                Claims::for_subject(user.username.as_str()),
            )
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::warn!(username = %username, "Login rejected: wrong password");
                    AuthError::InvalidCredentials
                }
                other => AuthError::TokenIssuance(other.to_string()),
            })?;

        tracing::info!(user_id = %user.id, username = %username, "Access token issued");
        Ok(result.into())
    }

    async fn authorize(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Bearer token rejected");
            AuthError::InvalidToken
        })?;

        let Some(username) = claims
            .subject()
            .and_then(|sub| Username::new(sub.to_string()).ok())
        else {
            tracing::warn!(subject = ?claims.sub, "Token subject is not a username");
            return Err(AuthError::IdentityNotFound);
        };

        self.find_user(&username).await?.ok_or_else(|| {
            tracing::warn!(username = %username, "Token subject no longer in directory");
            AuthError::IdentityNotFound
        })
    }

    async fn reissue(&self, token: &str) -> Result<AccessToken, AuthError> {
        let user = self.authorize(token).await?;
        let access_token = self.issue_for(&user)?;

        tracing::info!(user_id = %user.id, username = %user.username, "Access token reissued");
        Ok(access_token)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use auth::Algorithm;
    use auth::JwtHandler;
    use auth::TokenSettings;
    use chrono::Duration;
    use chrono::NaiveDate;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::user::errors::UserError;
    use crate::domain::user::models::Dni;
    use crate::domain::user::models::PageRequest;
    use crate::domain::user::models::PersonName;
    use crate::domain::user::models::UserId;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_by_dni(&self, dni: &Dni) -> Result<Option<User>, UserError>;
            async fn list_page(&self, page: &PageRequest) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    fn settings() -> TokenSettings {
        TokenSettings::new(SECRET.to_vec(), Algorithm::HS256).unwrap()
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(&settings()))
    }

    fn alice(authenticator: &Authenticator) -> User {
        User {
            id: UserId::new(),
            username: Username::new("alice".to_string()).unwrap(),
            name: PersonName::new("Alice".to_string()).unwrap(),
            lastname: PersonName::new("Liddell".to_string()).unwrap(),
            birthday: NaiveDate::from_ymd_opt(1990, 5, 4).unwrap(),
            dni: Dni::new("12345678A".to_string()).unwrap(),
            password_hash: authenticator.hash_password("correct horse").unwrap(),
            created_at: Utc::now(),
        }
    }

    fn directory_with(user: User) -> MockTestUserRepository {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .returning(move |username| {
                Ok((username == &user.username).then(|| user.clone()))
            });
        repository
    }

    #[tokio::test]
    async fn test_login_success_issues_token_for_username() {
        let authenticator = authenticator();
        let repository = directory_with(alice(&authenticator));
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator));

        let token = service
            .login("alice", "correct horse")
            .await
            .expect("Login failed");

        assert_eq!(token.expires_in, 30 * 60);
        let claims = authenticator.validate_token(&token.value).unwrap();
        assert_eq!(claims.subject(), Some("alice"));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let authenticator = authenticator();
        let repository = directory_with(alice(&authenticator));
        let service = AuthService::new(Arc::new(repository), authenticator);

        let result = service.login("alice", "battery staple").await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let authenticator = authenticator();
        let repository = directory_with(alice(&authenticator));
        let service = AuthService::new(Arc::new(repository), authenticator);

        let result = service.login("bob", "correct horse").await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_user_pays_verification_cost() {
        let authenticator = authenticator();
        let repository = directory_with(alice(&authenticator));
        let service = AuthService::new(Arc::new(repository), authenticator);

        let started = Instant::now();
        let _ = service.login("alice", "battery staple").await;
        let wrong_password = started.elapsed();

        let started = Instant::now();
        let _ = service.login("bob", "battery staple").await;
        let unknown_user = started.elapsed();

        let started = Instant::now();
        let _ = service.login("x", "battery staple").await;
        let malformed_user = started.elapsed();

        assert!(unknown_user * 4 >= wrong_password);
        assert!(malformed_user * 4 >= wrong_password);
    }

    #[tokio::test]
    async fn test_login_malformed_username_skips_directory() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);
        let service = AuthService::new(Arc::new(repository), authenticator());

        let result = service.login("a b", "correct horse").await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_directory_failure() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));
        let service = AuthService::new(Arc::new(repository), authenticator());

        let result = service.login("alice", "correct horse").await;
        assert!(matches!(result, Err(AuthError::Directory(_))));
    }

    #[tokio::test]
    async fn test_authorize_resolves_identity() {
        let authenticator = authenticator();
        let user = alice(&authenticator);
        let repository = directory_with(user.clone());
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator));

        let token = authenticator
            .issue_token(Claims::for_subject("alice"))
            .unwrap();

        let identity = service.authorize(&token.access_token).await.unwrap();
        assert_eq!(identity, user);
    }

    #[tokio::test]
    async fn test_authorize_rejects_forged_token() {
        let authenticator = authenticator();
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);
        let service = AuthService::new(Arc::new(repository), authenticator);

        let forger = Authenticator::new(
            &TokenSettings::new(b"not-the-server-secret".to_vec(), Algorithm::HS256).unwrap(),
        );
        let token = forger.issue_token(Claims::for_subject("alice")).unwrap();

        let result = service.authorize(&token.access_token).await;
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_authorize_rejects_expired_token() {
        let authenticator = authenticator();
        let repository = directory_with(alice(&authenticator));
        let service = AuthService::new(Arc::new(repository), authenticator);

        let token = JwtHandler::new(&settings())
            .issue_at(
                Claims::for_subject("alice"),
                Some(Duration::minutes(30)),
                Utc::now() - Duration::minutes(45),
            )
            .unwrap();

        let result = service.authorize(&token).await;
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_authorize_token_without_subject() {
        let authenticator = authenticator();
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator));

        let token = authenticator
            .issue_token(Claims::new().with_extra("some_data", "example"))
            .unwrap();

        let result = service.authorize(&token.access_token).await;
        assert_eq!(result, Err(AuthError::IdentityNotFound));
    }

    #[tokio::test]
    async fn test_authorize_subject_removed_from_directory() {
        let authenticator = authenticator();
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator));

        let token = authenticator
            .issue_token(Claims::for_subject("alice"))
            .unwrap();

        let result = service.authorize(&token.access_token).await;
        assert_eq!(result, Err(AuthError::IdentityNotFound));
    }

    #[tokio::test]
    async fn test_reissue_requires_valid_token() {
        let authenticator = authenticator();
        let repository = directory_with(alice(&authenticator));
        let service = AuthService::new(Arc::new(repository), Arc::clone(&authenticator));

        let result = service.reissue("Bearer-looking-but-not-a-jwt").await;
        assert_eq!(result, Err(AuthError::InvalidToken));

        let original = authenticator
            .issue_token(Claims::for_subject("alice"))
            .unwrap();
        let reissued = service.reissue(&original.access_token).await.unwrap();

        let claims = authenticator.validate_token(&reissued.value).unwrap();
        assert_eq!(claims.subject(), Some("alice"));
    }
}

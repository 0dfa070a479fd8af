#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Algorithm;
use auth::Authenticator;
use auth::Claims;
use auth::JwtHandler;
use auth::TokenSettings;
use chrono::NaiveDate;
use tempfile::TempDir;
use user_service::config::UploadConfig;
use user_service::domain::authentication::service::AuthService;
use user_service::domain::user::errors::UserError;
use user_service::domain::user::models::CreateUserCommand;
use user_service::domain::user::models::Dni;
use user_service::domain::user::models::PageRequest;
use user_service::domain::user::models::PersonName;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::models::Username;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::ports::UserServicePort;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "secret";
pub const TEST_UPLOAD_LIMIT: usize = 64 * 1024;

/// Directory kept in process memory, enforcing the same uniqueness rules
/// as the Postgres schema.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    fn clash(users: &[User], candidate: &User) -> Option<UserError> {
        users
            .iter()
            .filter(|existing| existing.id != candidate.id)
            .find_map(|existing| {
                if existing.username == candidate.username {
                    Some(UserError::UsernameAlreadyExists(
                        candidate.username.to_string(),
                    ))
                } else if existing.dni == candidate.dni {
                    Some(UserError::DniAlreadyExists(candidate.dni.to_string()))
                } else {
                    None
                }
            })
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if let Some(err) = Self::clash(&users, &user) {
            return Err(err);
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| &u.username == username).cloned())
    }

    async fn find_by_dni(&self, dni: &Dni) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| &u.dni == dni).cloned())
    }

    async fn list_page(&self, page: &PageRequest) -> Result<Vec<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if let Some(err) = Self::clash(&users, &user) {
            return Err(err);
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| &u.id != id);
        if users.len() == before {
            return Err(UserError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let settings =
            TokenSettings::new(TEST_SECRET, Algorithm::HS256).expect("Invalid token settings");
        let repository = Arc::new(InMemoryUserRepository::default());
        let user_service = Arc::new(UserService::new(Arc::clone(&repository)));
        let auth_service = Arc::new(AuthService::new(
            repository,
            Arc::new(Authenticator::new(&settings)),
        ));

        let upload_dir = tempfile::tempdir().expect("Failed to create upload directory");
        let uploads = UploadConfig {
            directory: upload_dir.path().to_path_buf(),
            max_bytes: TEST_UPLOAD_LIMIT,
        };

        let router = create_router(Arc::clone(&user_service), auth_service, uploads);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(&settings),
            user_service,
            upload_dir,
        }
    }

    /// Insert a user straight into the directory with password `TEST_PASSWORD`.
    pub async fn seed_user(&self, username: &str, dni: &str) -> User {
        let command = CreateUserCommand {
            username: Username::new(username.to_string()).unwrap(),
            password: TEST_PASSWORD.to_string(),
            name: PersonName::new("Test".to_string()).unwrap(),
            lastname: PersonName::new("User".to_string()).unwrap(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
            dni: Dni::new(dni.to_string()).unwrap(),
        };
        self.user_service
            .create_user(command)
            .await
            .expect("Failed to seed user")
    }

    /// Log in through the token endpoint and return the access token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post("/token")
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Seed `username` and log in as that user.
    pub async fn seed_and_login(&self, username: &str, dni: &str) -> (User, String) {
        let user = self.seed_user(username, dni).await;
        let token = self.login(username, TEST_PASSWORD).await;
        (user, token)
    }

    /// Sign a token for an arbitrary subject with the server's key.
    pub fn token_for_subject(&self, subject: &str) -> String {
        self.jwt_handler
            .issue(Claims::for_subject(subject), None)
            .expect("Failed to sign token")
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }
}

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::current_user::current_user;
use super::handlers::delete_user::delete_user;
use super::handlers::export_users::export_users;
use super::handlers::get_user::get_user;
use super::handlers::health::health;
use super::handlers::issue_token::issue_token;
use super::handlers::list_users::list_users;
use super::handlers::update_user::update_user;
use super::handlers::upload_file::upload_file;
use super::middleware::authorize;
use crate::config::UploadConfig;
use crate::domain::authentication::service::AuthService;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::service::UserService;

pub struct AppState<UR: UserRepository> {
    pub user_service: Arc<UserService<UR>>,
    pub auth_service: Arc<AuthService<UR>>,
    pub uploads: Arc<UploadConfig>,
}

impl<UR: UserRepository> Clone for AppState<UR> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            auth_service: Arc::clone(&self.auth_service),
            uploads: Arc::clone(&self.uploads),
        }
    }
}

pub fn create_router<UR: UserRepository>(
    user_service: Arc<UserService<UR>>,
    auth_service: Arc<AuthService<UR>>,
    uploads: UploadConfig,
) -> Router {
    let upload_limit = uploads.max_bytes;
    let state = AppState {
        user_service,
        auth_service,
        uploads: Arc::new(uploads),
    };

    let public_routes = Router::new()
        .route("/token", post(issue_token::<UR>))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/users", get(list_users::<UR>).post(create_user::<UR>))
        .route("/users/me", get(current_user))
        .route("/users/csv", get(export_users::<UR>))
        .route(
            "/users/upload",
            post(upload_file::<UR>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/users/:user_id",
            get(get_user::<UR>)
                .patch(update_user::<UR>)
                .delete(delete_user::<UR>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authorize::<UR>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

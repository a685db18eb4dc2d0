use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;
use super::http::{HttpClient, Method, ReqwestClient};
use super::transport::{Body, Transport};
use crate::io::config_io::Settings;
use crate::io::session::Session;
use crate::model::{
    Credentials, Goal, GoalCreate, GoalUpdate, Health, LoginForm, Task, TaskCreate, TaskUpdate,
    TokenResponse, User, canonical_email,
};

/// The goal and task endpoints the collection states depend on
pub trait Backend {
    fn list_goals(&self) -> Result<Vec<Goal>, ApiError>;
    fn create_goal(&self, body: &GoalCreate) -> Result<Goal, ApiError>;
    fn update_goal(&self, goal_id: i64, body: &GoalUpdate) -> Result<Goal, ApiError>;
    fn delete_goal(&self, goal_id: i64) -> Result<(), ApiError>;
    fn list_tasks(&self, goal_id: i64) -> Result<Vec<Task>, ApiError>;
    fn create_task(&self, goal_id: i64, body: &TaskCreate) -> Result<Task, ApiError>;
    fn update_task(&self, task_id: i64, body: &TaskUpdate) -> Result<Task, ApiError>;
    fn delete_task(&self, task_id: i64) -> Result<(), ApiError>;
}

/// Typed client for every DevTrackr endpoint
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session, http: Arc<dyn HttpClient>) -> Self {
        ApiClient {
            transport: Transport::new(base_url, session, http),
        }
    }

    /// A reqwest-backed client for the configured API.
    pub fn from_settings(settings: &Settings, session: Session) -> Self {
        let http = ReqwestClient::new(Duration::from_secs(settings.config.api.timeout_secs));
        ApiClient::new(&settings.config.api.base_url, session, Arc::new(http))
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn session(&self) -> &Session {
        self.transport.session()
    }

    pub fn health(&self) -> Result<Health, ApiError> {
        self.transport.request_json(Method::GET, "/health", None)
    }

    pub fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = Body::json(&Credentials {
            email: canonical_email(email),
            password: password.to_string(),
        })?;
        self.transport
            .request_json(Method::POST, "/auth/register", Some(body))
    }

    /// Exchange credentials for a token and store it in the session.
    pub fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let body = Body::form(&LoginForm {
            username: canonical_email(email),
            password: password.to_string(),
        })?;
        let token: TokenResponse =
            self.transport
                .request_json(Method::POST, "/auth/login", Some(body))?;
        self.session().set_token(Some(&token.access_token));
        tracing::info!("logged in");
        Ok(token)
    }

    /// Forget the stored token. No network call.
    pub fn logout(&self) {
        self.session().clear();
    }

    pub fn me(&self) -> Result<User, ApiError> {
        self.transport.request_json(Method::GET, "/auth/me", None)
    }
}

impl Backend for ApiClient {
    fn list_goals(&self) -> Result<Vec<Goal>, ApiError> {
        self.transport.request_json(Method::GET, "/goals", None)
    }

    fn create_goal(&self, body: &GoalCreate) -> Result<Goal, ApiError> {
        self.transport
            .request_json(Method::POST, "/goals", Some(Body::json(body)?))
    }

    fn update_goal(&self, goal_id: i64, body: &GoalUpdate) -> Result<Goal, ApiError> {
        self.transport.request_json(
            Method::PUT,
            &format!("/goals/{goal_id}"),
            Some(Body::json(body)?),
        )
    }

    fn delete_goal(&self, goal_id: i64) -> Result<(), ApiError> {
        self.transport
            .request(Method::DELETE, &format!("/goals/{goal_id}"), None)
            .map(|_| ())
    }

    fn list_tasks(&self, goal_id: i64) -> Result<Vec<Task>, ApiError> {
        self.transport
            .request_json(Method::GET, &format!("/goals/{goal_id}/tasks"), None)
    }

    fn create_task(&self, goal_id: i64, body: &TaskCreate) -> Result<Task, ApiError> {
        self.transport.request_json(
            Method::POST,
            &format!("/goals/{goal_id}/tasks"),
            Some(Body::json(body)?),
        )
    }

    fn update_task(&self, task_id: i64, body: &TaskUpdate) -> Result<Task, ApiError> {
        self.transport.request_json(
            Method::PUT,
            &format!("/tasks/{task_id}"),
            Some(Body::json(body)?),
        )
    }

    fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
        self.transport
            .request(Method::DELETE, &format!("/tasks/{task_id}"), None)
            .map(|_| ())
    }
}

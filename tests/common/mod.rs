#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{http::header, test, web, App};
use serde_json::json;
use std::sync::Arc;
use taskledger::auth::{AuthResponse, TokenService};
use taskledger::routes;
use taskledger::services::{AccountService, TaskService};
use taskledger::store::{MemoryStore, TaskStore, UserStore};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Services over a fresh in-memory store.
pub struct TestState {
    pub accounts: web::Data<AccountService>,
    pub tasks: web::Data<TaskService>,
}

impl TestState {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let users: Arc<dyn UserStore> = store.clone();
        let tasks: Arc<dyn TaskStore> = store;
        let tokens = TokenService::new(TEST_SECRET).expect("test secret is not empty");

        Self {
            accounts: web::Data::new(AccountService::new(users, tokens, 4)),
            tasks: web::Data::new(TaskService::new(tasks)),
        }
    }
}

pub async fn init_app(
    state: &TestState,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state.accounts.clone())
            .app_data(state.tasks.clone())
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

pub struct TestUser {
    pub id: i32,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub async fn register_and_login_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req_register = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp_register = test::call_service(app, req_register).await;
    let status = resp_register.status();
    let body = test::read_body(resp_register).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let req_login = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp_login = test::call_service(app, req_login).await;
    let status = resp_login.status();
    let body = test::read_body(resp_login).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let auth: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;
    Ok(TestUser {
        id: auth.user.id,
        token: auth.token,
    })
}

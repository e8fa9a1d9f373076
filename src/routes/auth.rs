use crate::{
    auth::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse},
    error::AppError,
    models::UserSummary,
    services::AccountService,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates a new account and returns its public fields. A username or email that is
/// already taken is a `400 Bad Request`.
#[post("/register")]
pub async fn register(
    accounts: web::Data<AccountService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = accounts.register(register_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user: UserSummary::from(user),
    }))
}

/// Login user
///
/// Authenticates by email and password and returns a bearer token.
#[post("/login")]
pub async fn login(
    accounts: web::Data<AccountService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let (token, user) = accounts.login(login_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::AuthenticatedUser;
use crate::error::AppError;
use crate::services::AccountService;

/// Rejects requests without a valid bearer token and binds the caller to the request.
///
/// Wrap only the scopes that need protection; anything outside stays public. The
/// `AccountService` must be registered as app data.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let outcome = authenticate(&req).await;
            match outcome {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                // Answer here instead of returning Err so the rejection is a regular response
                Err(err) => Ok(req.error_response(err).map_into_right_body()),
            }
        })
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let accounts = req
        .app_data::<web::Data<AccountService>>()
        .cloned()
        .ok_or_else(|| AppError::Configuration("AccountService is not registered".into()))?;

    let authorization = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AppError::Unauthorized("Invalid authorization header".into()))?
                .to_owned(),
        ),
        None => None,
    };

    resolve_identity(authorization.as_deref(), &accounts).await
}

/// Turns the raw `Authorization` header value into the caller's identity.
///
/// Missing header, a header without the `Bearer ` scheme, a token that fails
/// verification and a token whose user no longer exists are all `Unauthorized`.
pub async fn resolve_identity(
    authorization: Option<&str>,
    accounts: &AccountService,
) -> Result<AuthenticatedUser, AppError> {
    let header = authorization
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".into()))?;

    let username = accounts.tokens().verify(token).map_err(|e| {
        log::debug!("Rejected bearer token: {}", e);
        AppError::Unauthorized("Invalid or expired token".into())
    })?;

    let user = accounts
        .find_by_username(&username)
        .await?
        .ok_or_else(|| {
            log::warn!("Token subject {} has no matching account", username);
            AppError::Unauthorized("User not found".into())
        })?;

    Ok(AuthenticatedUser {
        id: user.id,
        username: user.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{RegisterRequest, TokenService};
    use crate::store::MemoryStore;
    use actix_web::{http::StatusCode, test, App, HttpResponse};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    async fn accounts_with_bob() -> AccountService {
        let accounts = AccountService::new(
            Arc::new(MemoryStore::new()),
            TokenService::new("middleware-test-secret").unwrap(),
            4,
        );
        accounts
            .register(RegisterRequest {
                username: "bob".to_string(),
                email: "bob@x.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        accounts
    }

    fn is_unauthorized(result: Result<AuthenticatedUser, AppError>) -> bool {
        matches!(result, Err(AppError::Unauthorized(_)))
    }

    #[actix_rt::test]
    async fn test_resolve_identity_success() {
        let accounts = accounts_with_bob().await;
        let token = accounts.tokens().issue("bob").unwrap();

        let user = resolve_identity(Some(&format!("Bearer {}", token)), &accounts)
            .await
            .unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.id, 1);
    }

    #[actix_rt::test]
    async fn test_resolve_identity_failures() {
        let accounts = accounts_with_bob().await;
        let token = accounts.tokens().issue("bob").unwrap();
        let expired = accounts
            .tokens()
            .issue_at("bob", Utc::now() - Duration::hours(48))
            .unwrap();
        let ghost = accounts.tokens().issue("ghost").unwrap();

        assert!(is_unauthorized(resolve_identity(None, &accounts).await));
        assert!(is_unauthorized(resolve_identity(Some(""), &accounts).await));
        assert!(is_unauthorized(resolve_identity(Some(&token), &accounts).await));
        assert!(is_unauthorized(
            resolve_identity(Some("Bearer not-a-token"), &accounts).await
        ));
        assert!(is_unauthorized(
            resolve_identity(Some(&format!("Bearer {}", expired)), &accounts).await
        ));
        assert!(is_unauthorized(
            resolve_identity(Some(&format!("Bearer {}", ghost)), &accounts).await
        ));
    }

    #[actix_rt::test]
    async fn test_middleware_gates_requests() {
        let accounts = web::Data::new(accounts_with_bob().await);
        let token = accounts.tokens().issue("bob").unwrap();

        let app = test::init_service(
            App::new().app_data(accounts.clone()).service(
                web::scope("/private")
                    .wrap(AuthMiddleware)
                    .route(
                        "",
                        web::get().to(|user: AuthenticatedUser| async move {
                            HttpResponse::Ok().body(user.username)
                        }),
                    ),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/private").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/private")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, "bob");
    }
}

// src/middleware/auth.rs
use std::future::{ready, Ready};
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform}, error::{ErrorForbidden, ErrorUnauthorized}, http::header, web, Error, HttpMessage
};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, Validation, Algorithm};

use crate::config::jwt::JwtSettings;
use crate::models::user::{Claims, UserStatus};

/// Extract and validate the bearer token, returning the decoded claims.
pub fn validate_jwt_from_request(req: &ServiceRequest) -> Result<Claims, Error> {
    // Get JWT settings from app state
    let jwt_settings = req.app_data::<web::Data<JwtSettings>>()
        .ok_or_else(|| ErrorUnauthorized("JWT settings not found"))?;

    // Extract Authorization header
    let auth_header = req.headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ErrorUnauthorized("No authorization header"))?
        .to_str()
        .map_err(|_| ErrorUnauthorized("Invalid authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ErrorUnauthorized("Invalid authorization header format"))?;

    let token_data = decode::<Claims>(
        token,
        &jwt_settings.decoding_key(),
        &Validation::new(Algorithm::HS256),
    ).map_err(|e| {
        tracing::error!("Failed to decode token: {:?}", e);
        ErrorUnauthorized("Invalid token")
    })?;

    Ok(token_data.claims)
}

/// What a scope demands of the caller's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any signed-in account that is not banned.
    Member,
    /// Active admins and superadmins; they run competitions.
    Admin,
}

pub fn check_account(claims: &Claims, access: Access) -> Result<(), Error> {
    match access {
        Access::Member if claims.status == UserStatus::Banned => {
            tracing::warn!("Banned user attempted access: {}", claims.username);
            Err(ErrorUnauthorized("Account is banned"))
        }
        Access::Admin if claims.status != UserStatus::Active => {
            tracing::warn!("Inactive user attempted admin access: {}", claims.username);
            Err(ErrorUnauthorized("Account is not active"))
        }
        Access::Admin if !claims.is_admin() => {
            tracing::warn!("Non-admin user attempted admin access: {} (role: {:?})", claims.username, claims.role);
            Err(ErrorForbidden("Insufficient privileges"))
        }
        _ => Ok(()),
    }
}

/// Validates the bearer token and the account for every request in the scope
/// it wraps, then hands the `Claims` to handlers through request extensions.
pub struct AuthMiddleware {
    access: Access,
}

impl AuthMiddleware {
    pub fn members() -> Self {
        Self { access: Access::Member }
    }

    pub fn admins() -> Self {
        Self { access: Access::Admin }
    }
}

// Middleware factory
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            access: self.access,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    access: Access,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let access = self.access;
        let claims = match validate_jwt_from_request(&req).and_then(|claims| {
            check_account(&claims, access)?;
            Ok(claims)
        }) {
            Ok(claims) => claims,
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        // Store the claims in the request extensions for handlers to access
        req.extensions_mut().insert(claims);

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}

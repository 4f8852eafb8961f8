//! Handles user authentication in API requests
//!
//! The session token is an HttpOnly cookie set at signup/login. The
//! middleware verifies it, resolves the asserted email to a user row and
//! provides that row as [`ReqData`](actix_web::web::ReqData) to the
//! wrapped services. The identity is derived once here and passed on
//! explicitly, the handlers never look at the cookie themselves.
use crate::api::v1::response::ApiError;
use crate::auth::{AuthContext, VerifyError};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::Error;
use actix_web::web::Data;
use actix_web::{HttpMessage, ResponseError};
use database::Db;
use db_storage::users::User;
use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Name of the cookie carrying the session token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Middleware factory
///
/// Transforms into [`SessionAuthMiddleware`]
pub struct SessionAuth {
    pub db: Data<Db>,
    pub auth_ctx: Data<AuthContext>,
}

impl<S> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Transform = SessionAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddleware {
            service: Rc::new(service),
            db: self.db.clone(),
            auth_ctx: self.auth_ctx.clone(),
        }))
    }
}

/// Authentication middleware
///
/// Whenever an API request is received, the SessionAuthMiddleware will
/// validate the session token and provide the associated user as
/// [`ReqData`](actix_web::web::ReqData) for the subsequent services.
pub struct SessionAuthMiddleware<S> {
    service: Rc<S>,
    db: Data<Db>,
    auth_ctx: Data<AuthContext>,
}

type ResultFuture<O, E> = Pin<Box<dyn Future<Output = Result<O, E>>>>;

impl<S> Service<ServiceRequest> for SessionAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = ResultFuture<Self::Response, Self::Error>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let db = self.db.clone();
        let auth_ctx = self.auth_ctx.clone();

        let token = match req.cookie(ACCESS_TOKEN_COOKIE) {
            Some(cookie) => cookie.value().to_owned(),
            None => {
                let error = ApiError::unauthorized().with_message("Missing session token");
                let response = req.into_response(error.error_response());
                return Box::pin(ready(Ok(response)));
            }
        };

        Box::pin(async move {
            let current_user = check_session_token(db, auth_ctx, &token).await?;

            req.extensions_mut().insert(current_user);
            service.call(req).await
        })
    }
}

/// Verifies the session token and resolves the asserted identity to its
/// user row.
///
/// Token verification is the source of truth: the cookie's transport
/// expiry is shorter than the token's embedded expiry and carries no
/// weight here.
pub async fn check_session_token(
    db: Data<Db>,
    auth_ctx: Data<AuthContext>,
    token: &str,
) -> Result<User, ApiError> {
    let email = match auth_ctx.verify_token(token) {
        Ok(email) => email,
        Err(e @ (VerifyError::InvalidToken | VerifyError::InvalidSignature)) => {
            log::warn!("Invalid session token, {}", e);
            return Err(ApiError::unauthorized().with_message("Invalid session token"));
        }
        Err(VerifyError::Expired) => {
            return Err(ApiError::unauthorized()
                .with_code("session_expired")
                .with_message("The session has expired"));
        }
    };

    let current_user = crate::block(move || {
        let mut conn = db.get_conn()?;

        match User::get_opt(&mut conn, &email)? {
            None => {
                // only happens if a user gets deleted while a session token
                // is still in circulation
                log::warn!("The requesting user could not be found in the database");
                Err(ApiError::unauthorized())
            }
            Some(user) => Ok(user),
        }
    })
    .await??;

    Ok(current_user)
}

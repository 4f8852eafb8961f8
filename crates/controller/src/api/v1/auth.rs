//! Auth related API structs and Endpoints
use crate::api::v1::middleware::session_auth::ACCESS_TOKEN_COOKIE;
use crate::api::v1::response::{ApiError, NoContent};
use crate::auth::{password, AuthContext};
use crate::settings::Settings;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::web::{Data, Json, ReqData};
use actix_web::{get, post, HttpResponse};
use database::Db;
use db_storage::users::{NewUser, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The JSON body expected when making a *POST* request on `/auth/signup`
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpBody {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 50))]
    pub make: String,
    #[validate(length(max = 20))]
    pub model: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// JSON body of the response coming from the *POST* request on `/auth/signup`
#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub email: String,
}

/// The JSON body expected when making a *POST* request on `/auth/login`
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// JSON body of the response coming from the *POST* request on `/auth/login`
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
}

/// API Endpoint *POST /auth/signup*
///
/// Registers a new user with the provided credentials and profile fields
/// and directly issues a session cookie. Registering an email twice is a
/// conflict.
#[post("/auth/signup")]
pub async fn signup(
    settings: Data<Settings>,
    db: Data<Db>,
    auth_ctx: Data<AuthContext>,
    body: Json<SignUpBody>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    body.validate()?;

    let password_hash = password::hash_password(&body.password).map_err(|e| {
        log::error!("Failed to hash password during signup, {}", e);
        ApiError::internal()
    })?;

    let new_user = NewUser {
        email: body.email,
        display_name: body.name,
        password_hash,
        make: body.make,
        model: body.model,
    };

    let user = crate::block(move || -> Result<Option<User>, ApiError> {
        let mut conn = db.get_conn()?;

        Ok(new_user.try_insert(&mut conn)?)
    })
    .await??;

    let user = match user {
        Some(user) => user,
        None => {
            return Err(ApiError::conflict()
                .with_code("email_exists")
                .with_message("The email is already registered, please log in"));
        }
    };

    let token = issue_token(&auth_ctx, &user.email)?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, &settings))
        .json(SignUpResponse { email: user.email }))
}

/// API Endpoint *POST /auth/login*
///
/// Verifies the provided credentials and issues a session cookie. An
/// unknown email and a wrong password are indistinguishable in the
/// response.
#[post("/auth/login")]
pub async fn login(
    settings: Data<Settings>,
    db: Data<Db>,
    auth_ctx: Data<AuthContext>,
    body: Json<LoginBody>,
) -> Result<HttpResponse, ApiError> {
    let LoginBody { email, password } = body.into_inner();

    let verified_email = crate::block(move || -> Result<Option<String>, ApiError> {
        let mut conn = db.get_conn()?;

        // unknown email and wrong password take the same path, callers only
        // ever observe the same failure shape
        match User::get_opt(&mut conn, &email)? {
            Some(user) if password::verify_password(&password, &user.password_hash) => {
                Ok(Some(user.email))
            }
            _ => Ok(None),
        }
    })
    .await??;

    match verified_email {
        Some(email) => {
            let token = issue_token(&auth_ctx, &email)?;

            Ok(HttpResponse::Ok()
                .cookie(session_cookie(token, &settings))
                .json(LoginResponse {
                    message: "User authenticated",
                }))
        }
        None => Err(ApiError::unauthorized()
            .with_code("invalid_credentials")
            .with_message("Unknown email or wrong password")),
    }
}

/// API Endpoint *POST /auth/logout*
///
/// Clears the session cookie. The token itself stays valid until its
/// embedded expiry, there is no server-side session state to invalidate.
#[post("/auth/logout")]
pub async fn logout() -> HttpResponse {
    let cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(CookieDuration::ZERO)
        .finish();

    HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        message: "Logged out",
    })
}

/// API Endpoint *GET /auth/verify*
///
/// Reached through the session middleware; responding at all means the
/// presented token was valid.
#[get("/auth/verify")]
pub async fn verify(_current_user: ReqData<User>) -> NoContent {
    NoContent
}

fn issue_token(auth_ctx: &AuthContext, email: &str) -> Result<String, ApiError> {
    auth_ctx.issue_token(email).map_err(|e| {
        log::error!("Failed to issue session token, {}", e);
        ApiError::internal()
    })
}

/// Builds the session cookie.
///
/// The cookie max-age is the transport expiry only and is shorter than the
/// token's embedded expiry; verification trusts the token alone.
fn session_cookie(token: String, settings: &Settings) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(CookieDuration::seconds(
            settings.session.cookie_max_age_secs as i64,
        ))
        .finish()
}

//! Core library of the *Rideout Controller*
//!
//! # Example
//!
//! ```no_run
//! use rideout_controller_core::Controller;
//! use anyhow::Result;
//!
//! #[actix_web::main]
//! async fn main() {
//!     rideout_controller_core::try_or_exit(run()).await;
//! }
//!
//! async fn run() -> Result<()> {
//!     if let Some(controller) = Controller::create("Rideout Controller").await? {
//!         controller.run().await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::api::v1::response::error::json_error_handler;
use crate::auth::AuthContext;
use crate::geocode::GeocodeClient;
use crate::settings::Settings;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer, Scope};
use anyhow::{Context, Result};
use database::Db;
use std::net::Ipv6Addr;
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tracing_actix_web::TracingLogger;

pub mod api;
pub mod auth;
mod cli;
pub mod geocode;
pub mod settings;
mod trace;

#[derive(Debug, thiserror::Error)]
#[error("Blocking thread has panicked")]
pub struct BlockingError;

/// Custom version of `actix_web::web::block` which retains the current tracing span
pub async fn block<F, R>(f: F) -> Result<R, BlockingError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let span = tracing::Span::current();

    let fut = actix_rt::task::spawn_blocking(move || span.in_scope(f));

    fut.await.map_err(|_| BlockingError)
}

/// Wrapper of the main function. Correctly outputs the error to the logging
/// utility or stderr.
pub async fn try_or_exit<T, F>(f: F) -> T
where
    F: std::future::Future<Output = Result<T>>,
{
    match f.await {
        Ok(ok) => ok,
        Err(err) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("Crashed with error: {:?}", err);
            } else {
                eprintln!("Crashed with error: {err:?}");
            }

            std::process::exit(-1);
        }
    }
}

/// Controller struct representation containing all fields required to drive
/// the controller
pub struct Controller {
    /// Immutable settings loaded on [`Controller::create`], passed to every
    /// component at construction
    pub startup_settings: Arc<Settings>,

    db: Arc<Db>,

    auth_ctx: Arc<AuthContext>,

    geocode: Arc<GeocodeClient>,
}

impl Controller {
    /// Tries to create a controller from CLI arguments and then the settings.
    ///
    /// This can return Ok(None) which would indicate that the controller
    /// executed a CLI subprogram (e.g. `migrate-db`) and must now exit.
    ///
    /// Otherwise it will return itself which can be run using
    /// [`Controller::run`]
    pub async fn create(program_name: &str) -> Result<Option<Self>> {
        let args = cli::parse_args().await?;

        // Some args run commands by themselves and thus should exit here
        if !args.controller_should_start() {
            return Ok(None);
        }

        let settings = Settings::load(&args.config)?;

        trace::init(&settings.logging)?;

        log::info!("Starting {}", program_name);

        let controller = Self::init(settings).await?;

        Ok(Some(controller))
    }

    async fn init(settings: Settings) -> Result<Self> {
        let settings = Arc::new(settings);

        db_storage::migrations::migrate_from_url(&settings.database.url)
            .await
            .context("Failed to migrate database")?;

        // Connect to postgres
        let db = Arc::new(
            Db::connect_url(
                &settings.database.url,
                settings.database.max_connections,
                Some(settings.database.min_idle_connections),
            )
            .context("Failed to connect to database")?,
        );

        let auth_ctx = Arc::new(AuthContext::new(&settings.session));

        let geocode = Arc::new(GeocodeClient::new(settings.geocoding.clone()));

        Ok(Self {
            startup_settings: settings,
            db,
            auth_ctx,
            geocode,
        })
    }

    /// Runs the controller until a fatal error occurred or a shutdown is
    /// requested (e.g. SIGTERM).
    pub async fn run(self) -> Result<()> {
        let http_server = {
            let cors = self.startup_settings.http.cors.clone();

            let settings = Data::from(self.startup_settings.clone());
            let db = Data::from(self.db.clone());
            let auth_ctx = Data::from(self.auth_ctx.clone());
            let geocode = Data::from(self.geocode.clone());

            HttpServer::new(move || {
                let cors = setup_cors(&cors);

                App::new()
                    .wrap(TracingLogger::default())
                    .wrap(cors)
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(settings.clone())
                    .app_data(db.clone())
                    .app_data(auth_ctx.clone())
                    .app_data(geocode.clone())
                    .service(v1_scope(db.clone(), auth_ctx.clone()))
            })
        };

        let address = (Ipv6Addr::UNSPECIFIED, self.startup_settings.http.port);

        let http_server = http_server.bind(address).with_context(|| {
            format!("Failed to bind http server to {}:{}", address.0, address.1)
        })?;

        log::info!("Startup finished");

        let http_server = http_server.disable_signals().run();
        let http_server_handle = http_server.handle();

        actix_rt::spawn(http_server);

        ctrl_c()
            .await
            .context("Failed to wait for termination signal")?;

        log::info!("Got termination signal, exiting");

        http_server_handle.stop(true).await;

        log::info!("All tasks stopped, goodbye!");

        Ok(())
    }
}

fn v1_scope(db: Data<Db>, auth_ctx: Data<AuthContext>) -> Scope {
    // the latest version contains the root services
    web::scope("/v1")
        .service(api::v1::auth::signup)
        .service(api::v1::auth::login)
        .service(api::v1::auth::logout)
        .service(api::v1::news::news)
        .service(
            // empty scope to differentiate between public and session endpoints
            web::scope("")
                .wrap(api::v1::middleware::SessionAuth { db, auth_ctx })
                .service(api::v1::auth::verify)
                .service(api::v1::users::get_me)
                .service(api::v1::users::patch_location)
                .service(api::v1::events::get_events)
                .service(api::v1::events::new_event)
                .service(api::v1::events::patch_event)
                .service(api::v1::events::delete_event)
                .service(api::v1::events::rsvps::set_rsvp)
                .service(api::v1::geocode::geocode)
                .service(api::v1::geocode::autocomplete),
        )
}

fn setup_cors(settings: &settings::HttpCors) -> Cors {
    // cookies are the session transport, credentialed requests must be allowed
    let mut cors = Cors::default().supports_credentials();

    for origin in &settings.allowed_origin {
        cors = cors.allowed_origin(origin)
    }

    cors.allowed_header(header::CONTENT_TYPE).allow_any_method()
}

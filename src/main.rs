//! ZingCab backend server
//!
//! Wires the Postgres repositories, the credential store, the SMS gateway
//! and the booking engine into one actix-web server.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zingcab_api::{configure_api, json_config, path_config, query_config, AppState};
use zingcab_auth::JwtService;
use zingcab_cache::{RedisCache, RedisCredentialStore, RedisRateLimiter};
use zingcab_core::config::{OtpBackend, WriteStrategy};
use zingcab_core::traits::{BookingWriter, CredentialStore, RateLimiter, SmsGateway};
use zingcab_core::AppConfig;
use zingcab_db::{
    create_pool, run_migrations, PgAdminRepository, PgAssignmentRepository, PgBookingRepository,
    PgCarRepository, PgContactRepository, PgCouponRepository, PgDriverRepository,
    PgPaymentRepository, PgPool, PgRideDetailRepository, PgTransactionalBookingWriter,
    PgUserRepository,
};
use zingcab_services::{
    spawn_sweeper, AccountService, AuthThrottle, BackOfficeService, BookingOrchestrator, CompensatingBookingWriter,
    DispatchManager, InMemoryCredentialStore, InMemoryRateLimiter, LogSmsGateway, OtpService,
    PricingEngine, StatusSynchronizer, TwilioSmsGateway,
};

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "zingcab={lvl},zingcab_api={lvl},zingcab_services={lvl},zingcab_db={lvl},\
             zingcab_cache={lvl},zingcab_auth={lvl},actix_web=info,sqlx=warn",
            lvl = log_level
        ))
    });

    let json = env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

/// Redis connection, opened only when shared state lives in Redis
async fn redis_cache(config: &AppConfig) -> anyhow::Result<Option<RedisCache>> {
    match config.otp.backend {
        OtpBackend::Memory => Ok(None),
        OtpBackend::Redis => {
            let url = config
                .redis
                .url
                .as_deref()
                .context("otp.backend is redis but redis.url is not set")?;
            let cache = RedisCache::new(url).await.context("Failed to connect to Redis")?;
            Ok(Some(cache))
        }
    }
}

fn credential_store(cache: Option<&RedisCache>) -> Arc<dyn CredentialStore> {
    match cache {
        Some(cache) => {
            info!("OTP codes kept in Redis");
            Arc::new(RedisCredentialStore::new(cache.clone()))
        }
        None => {
            info!("OTP codes kept in process memory");
            Arc::new(InMemoryCredentialStore::new())
        }
    }
}

fn rate_limiter(cache: Option<&RedisCache>) -> Arc<dyn RateLimiter> {
    match cache {
        Some(cache) => Arc::new(RedisRateLimiter::new(cache.clone())),
        None => Arc::new(InMemoryRateLimiter::new()),
    }
}

fn sms_gateway(config: &AppConfig) -> anyhow::Result<Arc<dyn SmsGateway>> {
    if config.sms.delivers_sms() {
        let gateway = TwilioSmsGateway::from_config(&config.sms).context("Invalid SMS settings")?;
        info!("SMS delivery through Twilio");
        Ok(Arc::new(gateway))
    } else {
        warn!("SMS delivery disabled, OTP codes will only be logged");
        Ok(Arc::new(LogSmsGateway))
    }
}

fn booking_writer(config: &AppConfig, pool: &PgPool) -> Arc<dyn BookingWriter> {
    match config.booking.write_strategy {
        WriteStrategy::Transactional => Arc::new(PgTransactionalBookingWriter::new(pool.clone())),
        WriteStrategy::Compensating => Arc::new(CompensatingBookingWriter::new(
            Arc::new(PgBookingRepository::new(pool.clone())),
            Arc::new(PgRideDetailRepository::new(pool.clone())),
            Arc::new(PgPaymentRepository::new(pool.clone())),
        )),
    }
}

fn build_state(
    config: &AppConfig,
    pool: &PgPool,
    codes: Arc<dyn CredentialStore>,
    sms: Arc<dyn SmsGateway>,
    limiter: Arc<dyn RateLimiter>,
    jwt: Arc<JwtService>,
) -> AppState {
    let bookings = Arc::new(PgBookingRepository::new(pool.clone()));
    let details = Arc::new(PgRideDetailRepository::new(pool.clone()));
    let assignments = Arc::new(PgAssignmentRepository::new(pool.clone()));
    let drivers = Arc::new(PgDriverRepository::new(pool.clone()));

    let pricing = Arc::new(PricingEngine::from_config(
        Arc::new(PgCouponRepository::new(pool.clone())),
        &config.pricing,
    ));
    let otp = Arc::new(OtpService::from_config(codes, sms, &config.otp, &config.sms));

    AppState::new(
        BookingOrchestrator::new(
            bookings.clone(),
            details.clone(),
            assignments.clone(),
            booking_writer(config, pool),
            pricing,
        ),
        DispatchManager::new(
            bookings.clone(),
            details,
            assignments.clone(),
            drivers.clone(),
        ),
        StatusSynchronizer::new(bookings.clone(), assignments, config.dispatch.strict_transitions),
        AccountService::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            drivers.clone(),
            Arc::new(PgAdminRepository::new(pool.clone())),
            bookings,
            otp,
            jwt,
            AuthThrottle::from_config(limiter, &config.rate_limit),
        ),
        BackOfficeService::new(
            Arc::new(PgCarRepository::new(pool.clone())),
            Arc::new(PgContactRepository::new(pool.clone())),
            drivers,
        ),
    )
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting ZingCab backend v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("Failed to load configuration")?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;
    run_migrations(&pool).await.context("Failed to run migrations")?;

    let cache = redis_cache(&config).await?;
    let codes = credential_store(cache.as_ref());
    let sweeper = spawn_sweeper(
        codes.clone(),
        Duration::from_secs(config.otp.sweep_interval_secs.max(1)),
    );

    let jwt = Arc::new(JwtService::from_config(&config.auth));
    let state = build_state(
        &config,
        &pool,
        codes,
        sms_gateway(&config)?,
        rate_limiter(cache.as_ref()),
        jwt.clone(),
    );
    info!(
        "Sign-in attempts limited to {} per {}s",
        config.rate_limit.auth_max_attempts, config.rate_limit.auth_window_secs
    );

    info!(
        "Dispatch transitions: {}",
        if config.dispatch.strict_transitions { "strict" } else { "permissive" }
    );

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    let cors_origins = config.server.cors_origins.clone();
    info!("Starting HTTP server on {} with {} workers", bind_addr, workers);

    let server = HttpServer::new(move || {
        let origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .map(|o| origins.iter().any(|allowed| allowed.trim() == o))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::COOKIE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(jwt.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_api)
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run();

    server.await.context("HTTP server error")?;
    sweeper.abort();
    info!("Server stopped");
    Ok(())
}

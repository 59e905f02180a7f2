//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::auth::JwtService;
use crate::kernel::{
    create_mailer, create_moderation_service, PostgresWallet, PresenceRegistry, RoomHub,
    ServerDeps,
};
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{self, health_handler, stream_handler};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
    pub jwt_service: Arc<JwtService>,
}

/// Build the Axum application router.
///
/// Wires the concrete infrastructure (Postgres wallet, HTTP mailer, ruleset
/// moderation, in-process realtime hub) into `ServerDeps` and mounts every
/// route on top of it.
pub fn build_app(pool: PgPool, config: &Config) -> Router {
    let wallet = Arc::new(PostgresWallet::new(pool.clone()));
    let mailer = create_mailer(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
    );
    let moderation =
        create_moderation_service(config.moderation_enabled, &config.extra_banned_words);
    let room_hub = RoomHub::new();
    let presence = PresenceRegistry::new();

    // Sweep rooms whose last subscriber left without further publishes.
    let janitor_hub = room_hub.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tick.tick().await;
            janitor_hub.cleanup().await;
        }
    });

    let deps = Arc::new(ServerDeps::new(
        pool.clone(),
        wallet,
        mailer,
        moderation,
        room_hub,
        presence,
        config.economics,
        config.meeting_base_url.clone(),
    ));

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    let app_state = AxumAppState {
        db_pool: pool,
        deps,
        jwt_service: jwt_service.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/conversations",
            get(routes::conversations::list_conversations),
        )
        .route(
            "/api/conversations/:id/messages",
            get(routes::conversations::get_messages),
        )
        .route("/api/messages", post(routes::conversations::send_message))
        .route(
            "/api/conversations/:id/offers",
            get(routes::offers::list_offers),
        )
        .route("/api/offers", post(routes::offers::create_offer_handler))
        .route(
            "/api/offers/:id/accept",
            post(routes::offers::accept_offer_handler),
        )
        .route(
            "/api/offers/:id/reject",
            post(routes::offers::reject_offer_handler),
        )
        .route(
            "/api/conversations/:id/consultation",
            get(routes::consultations::status_handler),
        )
        .route(
            "/api/conversations/:id/consultation/pay",
            post(routes::consultations::pay_handler),
        )
        .route(
            "/api/conversations/:id/meeting",
            post(routes::consultations::schedule_handler),
        )
        .route("/api/conversations/:id/stream", get(stream_handler))
        .route(
            "/api/admin/conversations",
            get(routes::admin::list_conversations),
        )
        .route(
            "/api/admin/conversations/:id/messages",
            post(routes::admin::post_message),
        )
        .route(
            "/api/admin/conversations/:id/freeze",
            post(routes::admin::freeze),
        )
        .route(
            "/api/admin/conversations/:id/unfreeze",
            post(routes::admin::unfreeze),
        )
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

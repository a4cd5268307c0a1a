use reviews_api::{
    application::reviews::service::{ReviewService, ReviewServiceOptions},
    config::{Config, StoreBackend},
    domain::review::repository::ReviewRepository,
    infrastructure::{
        database::pool::create_pool,
        orders::{
            http_order_client::{HttpOrderClient, UnconfiguredOrderHistory},
            traits::OrderHistory,
        },
        repositories::{
            memory_review_repository::InMemoryReviewRepository,
            sqlx_review_repository::SqlxReviewRepository,
        },
        settings::config_settings::ConfigSettingsProvider,
    },
    presentation::http::{routes::create_router, state::AppState},
};
use axum::extract::DefaultBodyLimit;
use http::{HeaderValue, Method, header};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Uses RUST_LOG if set, otherwise sensible defaults
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| {
            tracing_subscriber::EnvFilter::try_new("info,reviews_api=debug,tower_http=debug")
        })
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env()?;
    let call_timeout = Duration::from_millis(config.store_call_timeout_ms);

    let repository: Arc<dyn ReviewRepository> = match config.review_store {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
            let db = create_pool(database_url, config.database_max_connections, call_timeout)
                .await?;
            let mut migrator = sqlx::migrate!("./migrations");
            migrator.set_ignore_missing(config.ignore_missing_migrations);
            migrator.run(&db).await?;
            Arc::new(SqlxReviewRepository::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory review store; data is lost on restart");
            Arc::new(InMemoryReviewRepository::new())
        }
    };

    let orders: Arc<dyn OrderHistory> = match &config.orders_api_url {
        Some(url) => Arc::new(HttpOrderClient::new(
            url.clone(),
            config.orders_api_token.clone(),
            Duration::from_secs(config.orders_api_timeout_seconds),
        )?),
        None => {
            tracing::warn!("ORDERS_API_URL not set; purchase verification will report unavailable");
            Arc::new(UnconfiguredOrderHistory)
        }
    };

    let reviews = Arc::new(ReviewService::new(
        repository,
        Arc::new(ConfigSettingsProvider::from_config(&config)),
        orders,
        ReviewServiceOptions {
            call_timeout,
            purchase_check_concurrency: config.purchase_check_concurrency,
        },
    ));

    let state = AppState::new(config.clone(), reviews);

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let app = create_router(state)
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Reviews API listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, initiating graceful shutdown");
        }
    }
}

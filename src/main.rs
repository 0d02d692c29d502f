use user_profiles::{build_app, db, serve, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "user_profiles=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("starting user profile api");
    let config = AppConfig::from_env();
    let pool = db::connect_lazy(&config)?;

    // A missing table is logged, not fatal; requests fail until it exists.
    match db::ensure_schema(&pool).await {
        Ok(()) => tracing::info!("database tables ready"),
        Err(e) => tracing::error!(error = %e, "failed to create database tables; continuing"),
    }

    let state = AppState::new(pool, config.clone());
    let app = build_app(state)?;
    serve(app, &config).await
}

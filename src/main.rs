use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibliolend::infrastructure::AppState;
use bibliolend::{config, db, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bibliolend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(db);

    // Check for seed flag
    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&state).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    let app = server::build_router(state, &config.cors_allowed_origins);

    // Find available port
    let Some(port) = server::find_available_port(config.port) else {
        tracing::error!("Failed to find available port near {}", config.port);
        std::process::exit(1);
    };

    if port != config.port {
        tracing::warn!(
            "Preferred port {} was not available, using port {} instead",
            config.port,
            port
        );
    }

    if let Err(e) = server::serve(app, port).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

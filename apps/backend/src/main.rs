use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use holdem_backend::config::db::DbProfile;
use holdem_backend::config::engine::EngineConfig;
use holdem_backend::infra::state::build_state;
use holdem_backend::routes;
use holdem_backend::services::hand_flow::HandFlowService;
use holdem_backend::services::notifications::{NotificationSink, NullSink, RedisNotificationSink};
use holdem_backend::AppState;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod telemetry;

/// Advance every open table on a fixed interval until cancelled.
async fn sweep_loop(state: AppState, token: CancellationToken) {
    let mut interval = tokio::time::interval(state.engine.sweep_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                match HandFlowService.sweep_expired_turns(&state).await {
                    Ok(report) => {
                        for failed in report.failures() {
                            if let Err(err) = &failed.result {
                                warn!(table_id = failed.table_id, error = %err, "sweep table failed");
                            }
                        }
                    }
                    Err(err) => error!(error = %err, "sweep failed"),
                }
            }
        }
    }
    info!("sweep loop stopped");
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let engine = match EngineConfig::from_env() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("❌ Invalid engine configuration: {e}");
            std::process::exit(1);
        }
    };

    let sink: Arc<dyn NotificationSink> = match std::env::var("REDIS_URL") {
        Ok(url) => match RedisNotificationSink::connect(&url).await {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                eprintln!("❌ Failed to connect to Redis: {e}");
                std::process::exit(1);
            }
        },
        Err(_) => {
            warn!("REDIS_URL not set, table events will not be published");
            Arc::new(NullSink)
        }
    };

    let app_state = match build_state()
        .with_db(DbProfile::Prod)
        .with_engine(engine)
        .with_sink(sink)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    println!("🚀 Starting hold'em backend on http://{}:{}", host, port);

    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(sweep_loop(app_state.clone(), shutdown.clone()));

    let data = web::Data::new(app_state.clone());
    let result = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    shutdown.cancel();
    app_state.scheduler.shutdown();
    if let Err(e) = sweeper.await {
        error!(error = %e, "sweep task panicked");
    }
    result
}

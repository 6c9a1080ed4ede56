use std::net::SocketAddr;
use tokio::sync::watch;
use waitlist_eta::queue::QueueEntry;
use waitlist_eta::{api, config, state};

fn init_tracing(level: &str) {
    let level = level.parse::<tracing::Level>().unwrap_or_else(|_| {
        eprintln!("unknown log level {level:?}, using info");
        tracing::Level::INFO
    });
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(config.log_level());
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        app = %config.app.name,
        "waitlist-eta starting"
    );

    let estimator = config.estimator_config();
    tracing::info!(
        historical_days = estimator.historical_days,
        hour_tolerance = estimator.hour_tolerance,
        minimum_wait_time = estimator.minimum_wait_time,
        maximum_wait_time = estimator.maximum_wait_time,
        "Estimator configured"
    );
    let state = state::shared(estimator);

    let queue_rx = match state.read() {
        Ok(guard) => guard.subscribe_queue(),
        Err(_) => return Err("state lock poisoned during startup".into()),
    };
    tokio::spawn(log_queue_changes(queue_rx));

    let app = api::router(state);
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn log_queue_changes(mut queue_rx: watch::Receiver<Vec<QueueEntry>>) {
    while queue_rx.changed().await.is_ok() {
        let queue = queue_rx.borrow_and_update();
        let next = queue.first().map(|entry| entry.id);
        tracing::debug!(queue_length = queue.len(), next_entry = ?next, "Queue updated");
    }
}

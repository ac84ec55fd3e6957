use fitclub_client::{config::Config, http_client::ReqwestClubClient};
use fitclub_tracker::PollCoordinator;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cfg = Config::from_env()?;
    let client = Arc::new(ReqwestClubClient::from_config(&cfg));
    let coordinator = Arc::new(PollCoordinator::new(client, cfg.week_start));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = coordinator.spawn_scheduler(cfg.poll_interval, shutdown_rx);

    // First cycle runs immediately; wait for it and print the snapshot.
    let result = coordinator.request_refresh().await;
    match &result.visits {
        Some(v) => println!(
            "visits: ytd={} month={} week={}",
            v.total_visits_ytd, v.visits_this_month, v.visits_this_week
        ),
        None => println!("no data yet: {:?}", result.last_error),
    }
    for event in result.reservations.unwrap_or_default() {
        println!("upcoming: {} @ {} ({})", event.summary, event.start, event.location);
    }

    tokio::signal::ctrl_c().await?;
    shutdown_tx.send(true)?;
    scheduler.await?;
    Ok(())
}

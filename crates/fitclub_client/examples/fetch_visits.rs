use chrono::{Datelike, NaiveDate, Utc};
use fitclub_client::{ClubClient, config::Config, http_client::ReqwestClubClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Example: expects FITCLUB_USERNAME / FITCLUB_PASSWORD / FITCLUB_BASE_URL in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestClubClient::from_config(&cfg);

    let today = Utc::now().date_naive();
    let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("jan 1");
    let visits = client.fetch_visits(year_start, today).await?;
    println!("{} visits so far this year", visits.len());
    if let Some(last) = visits.last() {
        println!("last check-in: {}", last.timestamp);
    }
    Ok(())
}

use mock_server::{MockApi, Visit};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("SYNTHIENT_API_KEY").unwrap_or_else(|_| "test-key".to_string());

    let session = Uuid::new_v4().to_string();
    let seeded: Vec<Visit> = (0..3)
        .map(|_| Visit::sample(&Uuid::new_v4().to_string(), &session))
        .collect();
    for visit in &seeded {
        info!(token = %visit.token, session = %visit.session, "seeded token");
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    mock_server::run(listener, MockApi::new(&api_key).with_visits(seeded)).await
}

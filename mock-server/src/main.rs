use mock_server::MockCredentials;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let defaults = MockCredentials::default();
    let credentials = MockCredentials {
        application_key: std::env::var("MOCK_APPLICATION_KEY").unwrap_or(defaults.application_key),
        application_secret: std::env::var("MOCK_APPLICATION_SECRET").unwrap_or(defaults.application_secret),
        consumer_key: std::env::var("MOCK_CONSUMER_KEY").unwrap_or(defaults.consumer_key),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, application_key = %credentials.application_key, "listening");
    mock_server::run(listener, credentials).await
}

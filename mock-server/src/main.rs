use mock_server::{MockConfig, DEFAULT_EMAIL, DEFAULT_PASSWORD};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let email = std::env::var("MOCK_EMAIL").unwrap_or_else(|_| DEFAULT_EMAIL.to_string());
    let password = std::env::var("MOCK_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());
    let strict_validation = std::env::var("MOCK_STRICT").is_ok_and(|v| v == "1" || v == "true");

    let config = MockConfig {
        users: vec![(email.clone(), password)],
        strict_validation,
        ..MockConfig::default()
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %email, strict_validation, "listening");
    mock_server::run_with(listener, config).await
}

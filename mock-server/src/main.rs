use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mock_server=debug")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let token = std::env::var("MOCK_API_TOKEN")
        .unwrap_or_else(|_| mock_server::DEFAULT_TOKEN.to_string());
    let db = mock_server::new_db(&token);

    // Optional seed file in the listing response format: {"orders": [...]}.
    if let Ok(path) = std::env::var("MOCK_ORDERS_FILE") {
        let seed: mock_server::OrderList =
            serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        info!(%path, count = seed.orders.len(), "seeded orders");
        db.write().await.orders = seed.orders;
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    mock_server::run(listener, db).await?;
    Ok(())
}

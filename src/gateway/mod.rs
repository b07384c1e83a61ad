//! HTTP Gateway
//!
//! JSON API over the wallet ledger:
//!
//! | Route                         | Handler                         |
//! |-------------------------------|---------------------------------|
//! | `GET  /wallets`               | [`handlers::list_wallets`]      |
//! | `GET  /wallets/{wallet_id}`   | [`handlers::get_wallet`]        |
//! | `GET  /transfers`             | [`handlers::list_transfers`]    |
//! | `GET  /transfers/{transfer_id}` | [`handlers::get_transfer`]    |
//! | `POST /transfers`             | [`handlers::create_transfer`]   |
//! | `GET  /health`                | [`handlers::health_check`]      |

pub mod handlers;
pub mod state;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/wallets", get(handlers::list_wallets))
        .route("/wallets/{wallet_id}", get(handlers::get_wallet))
        .route(
            "/transfers",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route("/transfers/{transfer_id}", get(handlers::get_transfer))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn run_server<F>(
    config: &GatewayConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(addr = %addr, error = %e, "Failed to bind gateway");
        e
    })?;

    tracing::info!(addr = %addr, version = handlers::VERSION, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

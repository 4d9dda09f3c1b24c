// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr};

use tracing_subscriber::EnvFilter;

use voucher_ledger_server::{api::router, state::AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Seeded in-memory state; configuration comes from the environment.
    let state = AppState::seeded();
    let app = router(state);

    // Parse bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!("Voucher ledger server listening on http://{addr} (docs at /docs)");

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .expect("HTTP server failed");
}

use actix::prelude::*;
use serde_json::Value;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod agent;
mod aggregator;
mod client;
mod config;
mod errors;
mod metrics;
mod models;
mod region;

use agent::{HandleEvent, OrderAgent, OrderAgentActor, RunCheck};
use aggregator::OrderAggregator;
use client::{ReqwestTransport, Routes, StoreClient};
use config::AppConfig;
use errors::ApiError;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging on stderr; stdout carries the emitted payloads.
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bigcommerce_order_agent=debug")),
        )
        .init();

    tracing::info!("🚀 Starting BigCommerce order agent");

    // === 1. Configuration ===
    let config = AppConfig::from_env()?;

    // === 2. Metrics registry ===
    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 3. Store client, aggregator and agent actor ===
    let transport = Arc::new(ReqwestTransport::new(&config.client)?);
    let store = StoreClient::new(transport, Routes::new(config.client.store_hash.as_str()))
        .with_metrics(metrics.clone());
    let aggregator = OrderAggregator::new(store, config.client.max_line_item_pages);
    let agent = OrderAgent::new(aggregator, config.agent.clone()).with_metrics(metrics.clone());
    let agent_addr = OrderAgentActor::new(agent).start();

    // === 4. Metrics and health endpoints ===
    if let Some(port) = config.metrics_port {
        let registry = Arc::new(metrics.registry().clone());
        let addr = agent_addr.clone();
        actix::spawn(async move {
            if let Err(e) = metrics::start_metrics_server(registry, addr, port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    // === 5. One payload per inbound message ===
    let mut handled = 0usize;
    if !std::io::stdin().is_terminal() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let payload = match serde_json::from_str::<Value>(&line) {
                Ok(message) => agent_addr.send(HandleEvent { message }).await?,
                Err(e) => {
                    tracing::warn!(error = %e, "Inbound message is not JSON");
                    ApiError::unexpected("", format!("Inbound message is not valid JSON: {}", e)).to_payload()
                }
            };

            emit(&payload).await?;
            handled += 1;
        }
    }

    // No inbound messages: check the configured order
    if handled == 0 {
        tracing::info!(order_id = %config.agent.order_id, "No inbound messages, checking configured order");
        let payload = agent_addr.send(RunCheck).await?;
        emit(&payload).await?;
    }

    tracing::info!(events = handled, "🎉 Done");

    Ok(())
}

async fn emit(payload: &Value) -> anyhow::Result<()> {
    let mut line = serde_json::to_vec(payload)?;
    line.push(b'\n');

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&line).await?;
    stdout.flush().await?;
    Ok(())
}

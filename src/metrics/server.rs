use actix::Addr;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

use crate::agent::{GetAgentHealth, OrderAgentActor};

/// Start the metrics HTTP server: `/metrics` and `/health`
pub async fn start_metrics_server(
    registry: Arc<Registry>,
    agent: Addr<OrderAgentActor>,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!("📊 Starting metrics server on http://0.0.0.0:{}/metrics", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(registry.clone()))
            .app_data(web::Data::new(agent.clone()))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
    })
    .workers(1)
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn metrics_handler(registry: web::Data<Arc<Registry>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler(agent: web::Data<Addr<OrderAgentActor>>) -> impl Responder {
    match agent.send(GetAgentHealth).await {
        Ok(health) => {
            let body = serde_json::json!({
                "service": "bigcommerce-order-agent",
                "status": health.status.label(),
                "details": health.details,
                "last_check": health.last_check,
            });
            if health.status.is_unhealthy() {
                HttpResponse::ServiceUnavailable().json(body)
            } else {
                HttpResponse::Ok().json(body)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Agent actor unavailable");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "service": "bigcommerce-order-agent",
                "status": "unhealthy",
            }))
        }
    }
}

/// Liveness probe, answered without contacting any provider
pub async fn health_handler() -> &'static str {
    "ok"
}

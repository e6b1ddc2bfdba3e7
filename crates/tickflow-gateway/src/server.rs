//! HTTP server exposing prometheus metrics and engine health.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::metrics::MetricsRegistry;

/// Lifecycle state of the gateway process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    /// Starting up
    Starting,
    /// Backtest in progress
    Running,
    /// Stopped
    Stopped,
}

impl AppStatus {
    /// Status label used in the health response
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AppStatus::Starting => "starting",
            AppStatus::Running => "running",
            AppStatus::Stopped => "stopped",
        }
    }
}

/// Shared state behind the metrics server
pub struct ServerState {
    /// Metrics registry the engine publishes into
    pub metrics: Arc<MetricsRegistry>,
    /// Application status
    pub status: RwLock<AppStatus>,
}

impl ServerState {
    /// Create a new server state
    #[must_use]
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            metrics,
            status: RwLock::new(AppStatus::Starting),
        }
    }

    /// Set application status
    pub async fn set_status(&self, status: AppStatus) {
        let mut s = self.status.write().await;
        *s = status;
    }

    /// Get application status
    pub async fn get_status(&self) -> AppStatus {
        *self.status.read().await
    }

    /// JSON health body with live engine progress pulled from the registry
    #[must_use]
    pub fn health_body(&self, status: AppStatus) -> String {
        format!(
            concat!(
                r#"{{"status":"{}","ticks":{},"loops":{},"fills":{},"#,
                r#""orders":{},"cancels":{},"risk_rejects":{},"equity":{:.2}}}"#
            ),
            status.as_str(),
            self.metrics.ticks_total.get(),
            self.metrics.loops_total.get(),
            self.metrics.fills_total.get(),
            self.metrics.orders_total.get(),
            self.metrics.cancels_total.get(),
            self.metrics.risk_rejects_total.get(),
            self.metrics.equity.get(),
        )
    }
}

/// Extract the request path from the first line of an HTTP request
fn request_path(request: &str) -> Option<&str> {
    let mut parts = request.lines().next()?.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    parts.next()
}

fn http_response(code: u16, content_type: &str, body: &str) -> String {
    let reason = if code == 200 { "OK" } else { "Not Found" };
    format!(
        "HTTP/1.1 {code} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

/// Respond to one decoded request
async fn respond(state: &ServerState, path: Option<&str>) -> String {
    match path {
        Some("/metrics") => http_response(200, "text/plain", &state.metrics.encode()),
        Some("/health") => {
            let status = state.get_status().await;
            http_response(200, "application/json", &state.health_body(status))
        }
        _ => http_response(404, "text/plain", ""),
    }
}

/// Start the metrics server
///
/// # Errors
///
/// Returns an error if the listener cannot bind.
pub async fn start_metrics_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("Metrics server listening on port {}", port);

    loop {
        let (mut socket, _) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];
            let Ok(n) = socket.read(&mut buffer).await else {
                return;
            };

            let request = String::from_utf8_lossy(&buffer[..n]);
            let response = respond(&state, request_path(&request)).await;
            let _ = socket.write_all(response.as_bytes()).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path() {
        assert_eq!(
            request_path("GET /metrics HTTP/1.1\r\nHost: x\r\n"),
            Some("/metrics")
        );
        assert_eq!(request_path("GET /health HTTP/1.1"), Some("/health"));
        assert_eq!(request_path("POST /metrics HTTP/1.1"), None);
        assert_eq!(request_path(""), None);
    }

    #[test]
    fn test_health_body_reflects_engine_progress() {
        let metrics = Arc::new(MetricsRegistry::new());
        let state = ServerState::new(metrics.clone());

        metrics.ticks_total.inc_by(42);
        metrics.fills_total.inc_by(7);
        metrics.equity.set(1_234.5);

        let body = state.health_body(AppStatus::Running);
        assert!(body.contains(r#""status":"running""#));
        assert!(body.contains(r#""ticks":42"#));
        assert!(body.contains(r#""fills":7"#));
        assert!(body.contains(r#""equity":1234.50"#));
    }

    #[test]
    fn test_http_response_shape() {
        let response = http_response(200, "text/plain", "ok");
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("\r\n\r\nok"));
        assert!(response.contains("Content-Length: 2"));
    }
}

// src/renderer.rs

use reqwest::Client;
use tracing::{error, info, instrument};
use url::Url;

use crate::config::RenderArgs;
use crate::fetch::fetch_json;
use crate::render::{render_body, Outcome, TableTarget};

/// Fetches the comparison records once and renders them into a target.
#[derive(Debug, Clone)]
pub struct TableRenderer {
    client: Client,
    endpoint: Url,
}

impl TableRenderer {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// A renderer for the configured endpoint with a fresh client.
    pub fn from_config(cfg: &RenderArgs) -> Self {
        Self::new(Client::new(), cfg.endpoint.clone())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch, guard against an empty result, then append header and body.
    ///
    /// Any fetch or parse failure is logged once and reported as
    /// [`Outcome::Failed`]; the target is only touched on success.
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint))]
    pub async fn render_into<T: TableTarget>(&self, target: &mut T) -> Outcome {
        let outcome = match fetch_json(&self.client, &self.endpoint).await {
            Ok(Some(body)) => render_body(&body, target),
            Ok(None) => Outcome::Empty,
            Err(e) => {
                error!(error = %format!("{:#}", e), "Error fetching comparison data");
                Outcome::Failed
            }
        };
        info!(?outcome, "render finished");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HtmlTable;
    use clap::Parser;
    use std::{
        io,
        net::TcpListener,
        sync::{Arc, Mutex},
    };
    use tracing_subscriber::EnvFilter;
    use warp::{http::StatusCode, Filter};

    /// Serve a fixed reply on `/get_comparison_data` from an ephemeral port.
    fn serve_fixed(status: StatusCode, body: &'static str) -> Url {
        let route = warp::path("get_comparison_data")
            .map(move || warp::reply::with_status(body, status));
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        Url::parse(&format!("http://{}/get_comparison_data", addr)).unwrap()
    }

    fn renderer(url: Url) -> TableRenderer {
        TableRenderer::new(Client::new(), url)
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn count(&self, needle: &str) -> usize {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes).matches(needle).count()
        }
    }

    fn capture_errors() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("comparison_table=error"))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (captured, guard)
    }

    #[test]
    fn test_from_config_uses_endpoint() {
        let args = RenderArgs::try_parse_from([
            "comparison-table",
            "--endpoint",
            "http://127.0.0.1:5001/get_comparison_data",
        ])
        .unwrap();

        let renderer = TableRenderer::from_config(&args);

        assert_eq!(
            renderer.endpoint().as_str(),
            "http://127.0.0.1:5001/get_comparison_data"
        );
    }

    #[tokio::test]
    async fn test_renders_fetched_records() {
        let url = serve_fixed(
            StatusCode::OK,
            r#"[{"Taxon":"Crocodylus porosus","poaching_risk_score":0.912},
                {"Taxon":"Python bivittatus","poaching_risk_score":0.5}]"#,
        );
        let mut table = HtmlTable::default();

        let outcome = renderer(url).render_into(&mut table).await;

        assert_eq!(outcome, Outcome::Rendered { columns: 2, rows: 2 });
        assert_eq!(table.header_texts(), vec!["TAXON", "POACHING RISK SCORE"]);
        assert_eq!(table.rows()[0].texts(), vec!["Crocodylus porosus", "0.912"]);
        assert_eq!(table.rows()[1].texts(), vec!["Python bivittatus", "0.5"]);
    }

    #[tokio::test]
    async fn test_empty_responses_are_silent() {
        let (captured, _guard) = capture_errors();

        for body in ["", "  \n", "[]", r#"{"error":"nope"}"#] {
            let url = serve_fixed(StatusCode::OK, body);
            let mut table = HtmlTable::default();

            let outcome = renderer(url).render_into(&mut table).await;

            assert_eq!(outcome, Outcome::Empty, "body {:?}", body);
            assert!(table.header().is_empty());
            assert!(table.rows().is_empty());
        }
        assert_eq!(captured.count("Error fetching comparison data"), 0);
    }

    #[tokio::test]
    async fn test_non_json_body_logs_once() {
        let (captured, _guard) = capture_errors();
        let url = serve_fixed(StatusCode::OK, "<html>not json</html>");
        let mut table = HtmlTable::default();

        let outcome = renderer(url).render_into(&mut table).await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(table.header().is_empty());
        assert!(table.rows().is_empty());
        assert_eq!(captured.count("Error fetching comparison data"), 1);
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let (captured, _guard) = capture_errors();
        let url = serve_fixed(
            StatusCode::NOT_FOUND,
            r#"{"error":"Comparison data CSV missing."}"#,
        );
        let mut table = HtmlTable::default();

        assert_eq!(renderer(url).render_into(&mut table).await, Outcome::Failed);
        assert!(table.rows().is_empty());
        assert_eq!(captured.count("Error fetching comparison data"), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_failure() {
        let (captured, _guard) = capture_errors();
        // grab a free port, then release it so nothing is listening
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = Url::parse(&format!("http://127.0.0.1:{}/get_comparison_data", port)).unwrap();
        let mut table = HtmlTable::default();

        assert_eq!(renderer(url).render_into(&mut table).await, Outcome::Failed);
        assert!(table.header().is_empty());
        assert_eq!(captured.count("Error fetching comparison data"), 1);
    }
}

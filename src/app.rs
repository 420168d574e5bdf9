use axum::{extract::State, response::Html, routing::get, Router};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chart;
use crate::loader;
use crate::reshape;
use crate::table::Schema;

/// Page skeleton with a `__FIGURES__` placeholder for the serialized figures.
const PAGE_TEMPLATE: &str = include_str!("./static/dashboard.html");

pub struct AppState {
    page: String,
}

/// Loads the input file, builds the dashboard page and serves it until the
/// process is terminated. All validation failures surface here, before the
/// server binds.
pub async fn run(file_path: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    // Load and validate
    let table = loader::load_table(file_path)?;
    let schema = Schema::detect(&table)?;
    info!(
        students = table.n_rows(),
        subjects = schema.subject_cols.len(),
        "loaded {}",
        file_path
    );

    // Reshape
    let long = reshape::melt(&table, &schema);
    let scatter = reshape::attach_totals(&long, &table, &schema);

    // Build charts and the page around them
    let figures = chart::dashboard_figures(&table, &schema, &long, &scatter);
    let page = render_page(&figures)?;

    let app_state = Arc::new(AppState { page });

    // Build router
    let app = Router::new()
        .route("/", get(serve_dashboard))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Fills the embedded page template with the serialized figure descriptors.
pub fn render_page(figures: &[Value]) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string(figures)?;
    // '<' only occurs inside JSON strings; escape it so the inline <script>
    // payload can never contain a closing tag.
    let payload = payload.replace('<', "\\u003c");
    Ok(PAGE_TEMPLATE.replace("__FIGURES__", &payload))
}

async fn serve_dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_embeds_the_figures() {
        let figures = vec![json!({
            "data": [{"type": "bar", "x": ["Asha"], "y": [90.0]}],
            "layout": {"title": {"text": "Subject-wise Marks (Animated)"}},
        })];
        let page = render_page(&figures).unwrap();

        assert!(page.contains("Students Performance Dashboard"));
        assert!(page.contains("chart-grid"));
        assert!(page.contains("Subject-wise Marks (Animated)"));
        assert!(!page.contains("__FIGURES__"));
    }

    #[test]
    fn inline_payload_cannot_close_the_script_tag() {
        let figures = vec![json!({
            "data": [{"hovertemplate": "<b>%{hovertext}</b></script>"}],
            "layout": {},
        })];
        let page = render_page(&figures).unwrap();

        // no closing script tags beyond the template's own
        assert_eq!(
            page.matches("</script>").count(),
            PAGE_TEMPLATE.matches("</script>").count()
        );
        assert!(page.contains("\\u003cb>"));
    }
}

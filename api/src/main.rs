mod ask_payload;
mod handlers;
mod session_cookie;
mod session_store;
mod view;

use handlers::{router, AppState};
use pdf_qa::{ClaudeService, Config, DocumentProcessor, QueryService};
use session_store::SessionStore;
use std::sync::Arc;
use view::PageRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Must run before env_logger::init: it loads .env
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error de configuración: {}", e);
            std::process::exit(1);
        }
    };
    env_logger::init();

    let generator = Arc::new(ClaudeService::new(&config)?);
    let service = Arc::new(QueryService::new(
        Arc::new(DocumentProcessor::new()),
        generator,
        &config,
    ));

    let state = AppState {
        service,
        sessions: SessionStore::new(),
        renderer: Arc::new(PageRenderer::new()?),
    };

    log::info!(
        "Using model {} with {} document characters of context",
        config.model,
        config.context_chars
    );

    let app = router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

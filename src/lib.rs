pub mod error;
pub mod model;
pub mod printable;
pub mod quiz;
pub mod store;
pub mod timer;
pub mod upload;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    response::IntoResponse,
    routing::{get, get_service, post},
};
use tera::{Context, Tera};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use store::WordStore;

/// Builds the application router around a shared word store and template set.
pub fn app(store: Arc<WordStore>, templates: Arc<Tera>) -> Router {
    // Quiz API router
    let api_router = Router::new()
        .route("/files", get(store::list_files))
        .route("/upload", post(upload::upload_csv))
        .route("/quiz/{list_name}", get(quiz::get_quiz))
        .route("/submit", post(quiz::submit_quiz))
        .with_state(store.clone());

    // Printable sheet router
    let print_router = Router::new()
        .route("/{list_name}", get(printable::print_sheet))
        .with_state(store);

    Router::new()
        .route("/", get(index))
        .nest("/api", api_router)
        .nest("/print", print_router)
        .nest_service("/static", get_service(ServeDir::new("static")))
        .layer(Extension(templates))
}

pub async fn start_server() -> anyhow::Result<()> {
    let problems_dir = std::env::var("PROBLEMS_DIR").unwrap_or_else(|_| "problems".into());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());

    let store = Arc::new(WordStore::new(&problems_dir)?);

    // Warm the default list when it is already on disk.
    if let Err(e) = store.get_list("problems.csv") {
        log::info!("No default problems.csv to preload: {}", e);
    }

    // Templates configuration
    let templates = match Tera::new("templates/**/*.html") {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    let templates = Arc::new(templates);

    let app = app(store, templates);

    // Start server
    let listener = TcpListener::bind(&bind_addr).await?;
    log::info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index(Extension(templates): Extension<Arc<Tera>>) -> impl IntoResponse {
    let mut context = Context::new();
    context.insert("default_count", &quiz::DEFAULT_QUESTION_COUNT);
    context.insert("warning_after_secs", &timer::WARNING_AFTER_SECS);
    context.insert("timeout_after_secs", &timer::TIMEOUT_AFTER_SECS);
    utils::render_template(&templates, "index.html", context)
}

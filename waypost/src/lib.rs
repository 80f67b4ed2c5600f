//! # waypost: commit map markers to GitHub
//!
//! `waypost` is a single-endpoint HTTP service that lets a static map
//! front-end "save" edited marker data without a database: the browser posts
//! a JSON array of markers, and the service commits it as a file to a GitHub
//! repository via the contents REST API. The repository is the sole system of
//! record; the service holds no durable state of its own.
//!
//! ## Request flow
//!
//! A `POST /save` request is handled in a strictly linear sequence: the body
//! is parsed and the `markers` array validated, the required GitHub settings
//! are checked, the current revision pointer of the target file is read (404
//! means the file is created), the markers are rendered as indented JSON,
//! base64-encoded, and written back with a timestamped commit message. The
//! response reports the committed path, branch, and the new content/commit
//! shas. `OPTIONS` preflights are answered before routing, and every
//! response — success or failure — carries the cross-origin headers.
//!
//! The write is conditioned on the sha read moments earlier; if another
//! writer changed the file in between, GitHub decides the outcome. The
//! service neither detects nor resolves that race.
//!
//! ## Quick start
//!
//! ```no_run
//! use clap::Parser;
//! use waypost::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = waypost::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     waypost::telemetry::init_telemetry()?;
//!
//!     Application::new(config)
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod store;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Router, ServiceExt,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::any,
};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

pub use config::Config;
use store::{ContentStore, GithubContentStore};

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ContentStore>,
}

/// Cross-origin middleware, applied before path matching.
///
/// Short-circuits `OPTIONS` on any path with an empty 200 and stamps the
/// three CORS headers onto every other response, whichever branch produced
/// it. The contract requires the headers on error responses too, which is
/// why this is not tower-http's `CorsLayer` (that only answers requests
/// carrying an `Origin` header).
async fn cors_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let allow_origin = state
        .config
        .allow_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("*"));

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    response
}

/// Build the application router.
///
/// The save endpoint is registered with `any()` so non-POST methods reach the
/// handler's method guard (and get a 405 with CORS headers) instead of axum's
/// bare 405.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/save", any(api::handlers::markers::save))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}

/// Main application struct owning the router and configuration.
///
/// 1. **Create**: [`Application::new`] wires the GitHub client and router
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    app_state: AppState,
    config: Config,
}

impl Application {
    /// Create an application instance backed by the real GitHub API.
    pub fn new(config: Config) -> Self {
        let store = Arc::new(GithubContentStore::new(config.github_api_base.clone()));
        Self::new_with_store(config, store)
    }

    /// Create an application instance with an explicit content store (for tests).
    pub fn new_with_store(config: Config, store: Arc<dyn ContentStore>) -> Self {
        let app_state = AppState {
            config: config.clone(),
            store,
        };
        let router = build_router(app_state.clone());
        Self {
            router,
            app_state,
            config,
        }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        // Apply middleware before path matching for tests
        let middleware = from_fn_with_state(self.app_state, cors_middleware);
        let service = middleware.layer(self.router).into_make_service();
        axum_test::TestServer::new(service).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("waypost listening on http://{}", bind_addr);

        // Apply middleware before path matching so OPTIONS is answered on any path
        let middleware = from_fn_with_state(self.app_state, cors_middleware);
        let service = middleware.layer(self.router);

        axum::serve(listener, service.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

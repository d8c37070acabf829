use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use std::sync::Arc;

use crate::{ServerError, dashboard, documents, expenses, fees, insights, payments, user};
use analysis::AnalysisProvider;
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub analysis: Arc<dyn AnalysisProvider>,
}

/// Resolves `Authorization: Bearer <token>` into the session's [`engine::User`].
///
/// The user is stored in the request extensions, so handlers never take the
/// student id from the body.
async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return Err(EngineError::Unauthorized("access token required".to_string()).into());
    };

    let user = state.engine.user_by_token(bearer.token()).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let authenticated = Router::new()
        .route("/profile", get(user::profile))
        .route("/fees", get(fees::get))
        .route("/fees/update", put(fees::update))
        .route("/payments", post(payments::create).get(payments::list))
        .route("/expenses", post(expenses::create).get(expenses::list))
        .route("/expenses/stats", get(expenses::stats))
        .route("/dashboard/financial", get(dashboard::financial))
        .route("/documents", post(documents::upload).get(documents::list))
        .route("/documents/{id}", get(documents::get))
        .route("/insights/{id}", get(insights::analyze))
        .route("/quick-insights", get(insights::quick))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .merge(authenticated)
        .with_state(state)
}

pub async fn run(
    engine: Engine,
    analysis: Arc<dyn AnalysisProvider>,
    bind: &str,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    run_with_listener(engine, analysis, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    analysis: Arc<dyn AnalysisProvider>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);
    tracing::info!("Analysis provider: {}", analysis.name());

    let state = ServerState {
        engine: Arc::new(engine),
        analysis,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    analysis: Arc<dyn AnalysisProvider>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, analysis, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{installments, obligations, store::ObligationStore, transactions};

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<ObligationStore>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/obligations",
            post(obligations::create).get(obligations::list),
        )
        .route(
            "/obligations/{id}",
            get(obligations::get).delete(obligations::delete),
        )
        .route("/obligations/{id}/activate", post(obligations::activate))
        .route("/obligations/{id}/close", post(obligations::close))
        .route("/obligations/{id}/reopen", post(obligations::reopen))
        .route(
            "/obligations/{id}/principal",
            post(obligations::increase_principal),
        )
        .route(
            "/obligations/{id}/transactions",
            post(transactions::append),
        )
        .route(
            "/obligations/{id}/transactions/{transaction_id}/remove",
            post(transactions::remove),
        )
        .route(
            "/obligations/{id}/installments",
            put(installments::set_schedule),
        )
        .route(
            "/obligations/{id}/installments/paid",
            post(installments::mark_paid),
        )
        .with_state(state)
}

/// Builds the application router over a shared store. Exposed for tests and
/// embedders; `run`/`run_with_listener` wrap it for the binary.
pub fn app(store: Arc<ObligationStore>) -> Router {
    router(ServerState { store })
}

pub async fn run(store: Arc<ObligationStore>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(store, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    store: Arc<ObligationStore>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(store)).await
}

pub fn spawn_with_listener(
    store: Arc<ObligationStore>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(store, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

//! Axum integration: serves gated posts

use crate::config::parse_address;
use crate::context::AppContext;
use crate::gate::{GateState, TokenGate};
use crate::membership::{AccountEvents, MembershipStatus};
use crate::post::{PostBody, PostStore};
use crate::rpc::MembershipQuery;
use crate::template::{escape_html, render_page, Html};
use crate::wallet::{Connector, WalletConnection};
use crate::GateError;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    response::{self, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Seconds before a page rendered while loading asks the browser to retry
pub const LOADING_REFRESH_SECS: u32 = 2;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
    pub posts: Arc<PostStore>,
}

impl AppState {
    pub fn new(ctx: AppContext, posts: PostStore) -> Self {
        Self {
            ctx: Arc::new(ctx),
            posts: Arc::new(posts),
        }
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/membership/:address", get(membership_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([axum::http::Method::GET]),
        );

    Router::new()
        .route("/", get(index_handler))
        .route("/posts/:slug", get(post_handler))
        .route("/health", get(health_handler))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for WalletConnection
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(WalletConnection::from_cookie_header)
            .find(|connection| connection.is_connected)
            .unwrap_or_default())
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = match &self {
            GateError::PostNotFound { .. } => StatusCode::NOT_FOUND,
            GateError::InvalidAddress { .. } => StatusCode::BAD_REQUEST,
            GateError::Http(_) | GateError::Rpc { .. } | GateError::Decode { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn index_handler(State(state): State<AppState>) -> response::Html<String> {
    let items: String = state
        .posts
        .iter()
        .map(|post| {
            format!(
                r#"<li><a href="/posts/{}">{}</a></li>"#,
                escape_html(&post.slug),
                escape_html(&post.title)
            )
        })
        .collect();

    let body = Html::trusted(format!(
        r#"<div class="max-w-2xl mx-auto"><ul>{}</ul></div>"#,
        items
    ));
    response::Html(render_page("Posts", &body, state.ctx.page(), None).into_string())
}

async fn post_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    connection: WalletConnection,
) -> Result<response::Html<String>, GateError> {
    let post = state.posts.get(&slug)?;

    let status = if connection.is_connected {
        let accounts = AccountEvents::new(connection.address);
        let mut watcher = state.ctx.watch_membership(accounts.subscribe());
        watcher.settled(state.ctx.render_timeout()).await
    } else {
        MembershipStatus::idle()
    };

    let gate = TokenGate::new(state.ctx.lock());
    let view = PostBody::new(&post.content).render(&gate, &connection, &status)?;
    tracing::info!(slug = %slug, state = ?view.state, "rendered post");

    // the sign-in prompt carries its own account listener
    let body = match view.state {
        GateState::Connect => view.html,
        _ => Html::trusted(format!(
            "{}\n<script>\n{}\n</script>",
            view.html,
            connection
                .connector
                .unwrap_or(Connector::Injected)
                .account_listener_script()
        )),
    };

    let refresh = (view.state == GateState::Loading).then_some(LOADING_REFRESH_SECS);
    let page = render_page(&post.title, &body, state.ctx.page(), refresh);
    Ok(response::Html(page.into_string()))
}

async fn membership_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<serde_json::Value>, GateError> {
    let owner = parse_address(&address)
        .ok_or_else(|| GateError::invalid_address(address.as_str()))?;
    let lock = state.ctx.lock();

    let balance = state
        .ctx
        .query()
        .balance_of(&lock.lock_address, &owner)
        .await?;

    Ok(Json(json!({
        "address": format!("{:?}", owner),
        "lock": lock.lock_address_hex(),
        "network": lock.network,
        "isMember": !balance.is_zero(),
    })))
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let network = state.ctx.lock().network;
    let (healthy, chain) = match state.ctx.rpc().chain_id().await {
        Ok(chain_id) => (
            chain_id == network,
            json!({
                "chainId": chain_id,
                "matches": chain_id == network,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check could not reach the node");
            (false, json!({ "error": e.to_string() }))
        }
    };

    Json(json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "token-gate",
        "network": network,
        "rpc": chain,
        "posts": state.posts.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    routing::{delete, get, post},
    Json, Router,
};

use stockscan_core::UserId;
use stockscan_infra::MutationOutcome;

use crate::app::dto::{self, InventoryResponse};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::{export, scan};
use crate::app::services::AppServices;
use crate::sessions::{SessionState, UserSession};

pub fn router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(list))
        .route("/view", post(update_view))
        .route("/view/next", post(next_page))
        .route("/view/prev", post(previous_page))
        .route("/items", post(add_item))
        .route("/items/:name", delete(delete_item))
        .route("/items/:name/increment", post(increment))
        .route("/items/:name/decrement", post(decrement))
        .route("/import", post(import))
        .route("/scan", scan::route(max_upload_bytes))
        .route("/export", export::route())
}

/// Owner of the inventory, from the session's current-user snapshot.
fn owner(session: &UserSession) -> ApiResult<UserId> {
    session
        .current_user()
        .map(|user| user.user_id)
        .ok_or(ApiError::Unauthorized)
}

/// Cache the reloaded inventory and render the current page from it.
fn apply_outcome(state: &mut SessionState, outcome: MutationOutcome) -> InventoryResponse {
    let page = state.view.render(&outcome.inventory);
    state.inventory = Some(outcome.inventory.clone());
    InventoryResponse::with_failures(page, outcome)
}

async fn ensure_loaded(services: &AppServices, user: UserId, state: &mut SessionState) -> ApiResult<()> {
    if state.inventory.is_none() {
        state.inventory = Some(services.inventory.load(user).await?);
    }
    Ok(())
}

fn render_cached(state: &mut SessionState) -> InventoryResponse {
    let SessionState { view, inventory } = state;
    let items = inventory.as_deref().unwrap_or_default();
    InventoryResponse::page(view.render(items))
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Arc<UserSession>>,
) -> ApiResult<Json<InventoryResponse>> {
    let user = owner(&session)?;
    let mut state = session.state().await;

    let items = services.inventory.load(user).await?;
    state.inventory = Some(items);
    Ok(Json(render_cached(&mut state)))
}

pub async fn update_view(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Arc<UserSession>>,
    body: Option<Json<dto::ViewRequest>>,
) -> ApiResult<Json<InventoryResponse>> {
    let user = owner(&session)?;
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let mut state = session.state().await;
    ensure_loaded(&services, user, &mut state).await?;

    if let Some(search) = request.search {
        state.view.set_search(search);
    }
    if let Some(page) = request.page {
        // Bring total_pages up to date before clamping.
        render_cached(&mut state);
        state.view.go_to(page);
    }
    Ok(Json(render_cached(&mut state)))
}

pub async fn next_page(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Arc<UserSession>>,
) -> ApiResult<Json<InventoryResponse>> {
    let user = owner(&session)?;
    let mut state = session.state().await;
    ensure_loaded(&services, user, &mut state).await?;

    render_cached(&mut state);
    state.view.next_page();
    Ok(Json(render_cached(&mut state)))
}

pub async fn previous_page(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Arc<UserSession>>,
) -> ApiResult<Json<InventoryResponse>> {
    let user = owner(&session)?;
    let mut state = session.state().await;
    ensure_loaded(&services, user, &mut state).await?;

    render_cached(&mut state);
    state.view.previous_page();
    Ok(Json(render_cached(&mut state)))
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Arc<UserSession>>,
    Json(body): Json<dto::AddItemRequest>,
) -> ApiResult<Json<InventoryResponse>> {
    let user = owner(&session)?;
    let mut state = session.state().await;

    let outcome = services.inventory.add_one(user, &body.name).await?;
    Ok(Json(apply_outcome(&mut state, outcome)))
}

pub async fn increment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Arc<UserSession>>,
    Path(name): Path<String>,
) -> ApiResult<Json<InventoryResponse>> {
    let user = owner(&session)?;
    let mut state = session.state().await;

    let outcome = services.inventory.add_one(user, &name).await?;
    Ok(Json(apply_outcome(&mut state, outcome)))
}

pub async fn decrement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Arc<UserSession>>,
    Path(name): Path<String>,
) -> ApiResult<Json<InventoryResponse>> {
    let user = owner(&session)?;
    let mut state = session.state().await;

    let outcome = services.inventory.remove_one(user, &name).await?;
    Ok(Json(apply_outcome(&mut state, outcome)))
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Arc<UserSession>>,
    Path(name): Path<String>,
) -> ApiResult<Json<InventoryResponse>> {
    let user = owner(&session)?;
    let mut state = session.state().await;

    let outcome = services.inventory.delete(user, &name).await?;
    Ok(Json(apply_outcome(&mut state, outcome)))
}

pub async fn import(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Arc<UserSession>>,
    Json(body): Json<dto::ImportRequest>,
) -> ApiResult<Json<InventoryResponse>> {
    let user = owner(&session)?;
    let mut state = session.state().await;

    let outcome = services.inventory.import(user, &body.items).await?;
    Ok(Json(apply_outcome(&mut state, outcome)))
}

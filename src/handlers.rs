/// axum HTTP 표면
/// 전송 계층일 뿐이며 모든 판정은 bidding/query 모듈이 내린다.
// region:    --- Imports
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
use crate::bidding::error::{BidRejection, EngineError, StoreError};
use crate::config::BidPolicy;
use crate::identity::IdentityProvider;
use crate::message_broker::NoticePublisher;
use crate::query;
use crate::store::BidStore;

// endregion: --- Imports

// region:    --- App State & Router

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BidStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub publisher: Arc<dyn NoticePublisher>,
    pub policy: Arc<BidPolicy>,
}

/// 라우터 구성
pub fn routes(state: AppState) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/bid", post(handle_bid))
        .route("/items", get(handle_get_items))
        .route("/items/:id", get(handle_get_item))
        .route("/items/:id/bid-state", get(handle_get_bid_state))
        .route("/items/:id/bids", get(handle_get_item_bids))
        .route("/events/:id", get(handle_get_event))
        .layer(cors)
        .with_state(state)
}

// endregion: --- App State & Router

// region:    --- Error Mapping

fn rejection_status(rejection: &BidRejection) -> StatusCode {
    match rejection {
        BidRejection::Unauthenticated => StatusCode::UNAUTHORIZED,
        BidRejection::Banned | BidRejection::NotApproved => StatusCode::FORBIDDEN,
        BidRejection::SelfBid
        | BidRejection::NotStarted
        | BidRejection::AlreadyEnded
        | BidRejection::BidTooLow { .. } => StatusCode::BAD_REQUEST,
        BidRejection::IncrementConfig => StatusCode::INTERNAL_SERVER_ERROR,
        BidRejection::RetryExhausted => StatusCode::CONFLICT,
    }
}

fn engine_error_response(err: EngineError) -> Response {
    match err {
        EngineError::Rejected(rejection) => {
            let mut body = serde_json::json!({
                "error": rejection.to_string(),
                "code": rejection.code(),
            });
            if let Some(minimum) = rejection.minimum() {
                body["minimum"] = serde_json::json!(minimum);
            }
            (rejection_status(&rejection), Json(body)).into_response()
        }
        EngineError::Store(StoreError::ItemNotFound(id)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("상품을 찾을 수 없습니다. (id: {})", id),
                "code": "NOT_FOUND",
            })),
        )
            .into_response(),
        EngineError::Store(store_err) => {
            error!("{:<12} --> 저장소 오류: {:?}", "Handler", store_err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": store_err.to_string(),
                    "code": "INTERNAL",
                })),
            )
                .into_response()
        }
    }
}

// endregion: --- Error Mapping

// region:    --- Command Handlers

/// 입찰 요청 처리
pub async fn handle_bid(
    State(state): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Response {
    match handle_place_bid(
        cmd,
        state.store.as_ref(),
        state.identity.as_ref(),
        state.publisher.as_ref(),
        &state.policy,
    )
    .await
    {
        Ok(accepted) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "입찰이 성공적으로 처리되었습니다.",
                "amount": accepted.amount,
                "new_minimum": accepted.new_minimum,
                "extended": accepted.extended,
                "new_ends_at": accepted.new_ends_at,
            })),
        )
            .into_response(),
        Err(e) => engine_error_response(e),
    }
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

#[derive(Debug, Deserialize)]
pub struct BidStateParams {
    pub bidder_id: Option<i64>,
}

/// 상품 입찰 상태 조회
pub async fn handle_get_bid_state(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Query(params): Query<BidStateParams>,
) -> Response {
    match query::handlers::get_bid_state(
        state.store.as_ref(),
        state.identity.as_ref(),
        &state.policy,
        item_id,
        params.bidder_id,
    )
    .await
    {
        Ok(bid_state) => Json(bid_state).into_response(),
        Err(e) => engine_error_response(e),
    }
}

/// 모든 상품 조회
pub async fn handle_get_items(State(state): State<AppState>) -> Response {
    match query::handlers::get_all_items(state.store.as_ref()).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => engine_error_response(e),
    }
}

/// 상품 조회
pub async fn handle_get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Response {
    match query::handlers::get_item(state.store.as_ref(), item_id).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => engine_error_response(e),
    }
}

/// 상품 입찰 이력 조회
pub async fn handle_get_item_bids(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Response {
    match query::handlers::get_bid_history(state.store.as_ref(), item_id).await {
        Ok(bids) => Json(bids).into_response(),
        Err(e) => engine_error_response(e),
    }
}

/// 경매 이벤트 조회
pub async fn handle_get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Response {
    match query::handlers::get_event(state.store.as_ref(), event_id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => engine_error_response(e),
    }
}

// endregion: --- Query Handlers

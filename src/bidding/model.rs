use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bidding::clock::Phase;

// 경매 이벤트 모델
// status 컬럼은 목록/필터 표시용 캐시이며 입찰 판정에는 사용하지 않는다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuctionEvent {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub soft_close_window_secs: Option<i64>,
    pub soft_close_extend_secs: Option<i64>,
    pub increment_table_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// 출품 상품 모델
// current_bid 는 입찰 원장의 최고가 미러(캐시)이며 검증의 근거가 아니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuctionItem {
    pub id: i64,
    pub event_id: i64,
    pub title: String,
    pub description: String,
    pub seller_id: Option<i64>,
    pub status: String,
    pub starting_bid: i64,
    pub current_bid: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// 호가 단위 구간 모델
// max_amount 가 NULL 이면 마지막 무제한 구간
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IncrementTier {
    pub table_id: i64,
    pub min_amount: i64,
    pub max_amount: Option<i64>,
    pub increment: i64,
}

// 입찰 모델 (생성 이후 불변)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub item_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

// 입찰자 프로필 (외부 인증 시스템 소유, 읽기 전용)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BidderProfile {
    pub id: i64,
    pub approved: bool,
    pub banned: bool,
}

/// 상품 입찰 상태 조회 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidState {
    pub current_price: i64,
    pub next_minimum_bid: i64,
    pub increment_step: i64,
    pub phase: Phase,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_caller_leading: bool,
    pub can_caller_bid: bool,
}

/// 입찰 원장 저장소 경계
/// 상품 단위 격리(CAS) 커밋과 표시용 조회를 제공한다.
// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::bidding::error::StoreError;
use crate::bidding::model::{AuctionEvent, AuctionItem, Bid, IncrementTier};

pub mod memory;
pub mod postgres;

pub use memory::MemoryBidStore;
pub use postgres::PostgresBidStore;

// endregion: --- Imports

// region:    --- Snapshot & Attempt

/// 락 없이 읽은 입찰 기준 상태
/// tiers 가 None 이면 이벤트에 호가 테이블이 없어 플랫폼 기본값을 쓴다.
#[derive(Debug, Clone)]
pub struct BidSnapshot {
    pub item: AuctionItem,
    pub event: AuctionEvent,
    pub top_bid: Option<Bid>,
    pub tiers: Option<Vec<IncrementTier>>,
}

/// 커밋 시도
/// expected_* 는 스냅샷 시점의 값이며, 커밋 시점과 다르면 Conflict 로 보고된다.
#[derive(Debug, Clone)]
pub struct BidAttempt {
    pub item_id: i64,
    pub event_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub expected_top: Option<i64>,
    pub expected_ends_at: DateTime<Utc>,
    pub new_ends_at: Option<DateTime<Utc>>,
}

/// 커밋 결과
#[derive(Debug, Clone)]
pub enum CommitOutcome {
    /// 입찰·미러·연장이 하나의 작업 단위로 확정됨
    Committed(Bid),
    /// 다른 입찰이 먼저 확정됨, 부수 효과 없음
    Conflict,
}

// endregion: --- Snapshot & Attempt

// region:    --- Bid Store Trait

/// 입찰 원장 저장소 트레이트
#[async_trait]
pub trait BidStore: Send + Sync {
    /// 상품·이벤트·최고 입찰·호가 구간을 한 번에 읽는다 (락 없음, 표시용으로도 사용)
    async fn bid_snapshot(&self, item_id: i64) -> Result<BidSnapshot, StoreError>;

    /// 상품 단위 격리 경계: 기대값 검증 후 입찰 추가 + 미러 갱신 + 연장을 원자적으로 커밋
    async fn commit_bid(&self, attempt: &BidAttempt) -> Result<CommitOutcome, StoreError>;

    /// 입찰 이력 (최신순, 언제든 다시 조회 가능)
    async fn bid_history(&self, item_id: i64) -> Result<Vec<Bid>, StoreError>;

    /// 상품 조회
    async fn load_item(&self, item_id: i64) -> Result<AuctionItem, StoreError>;

    /// 모든 상품 조회
    async fn list_items(&self) -> Result<Vec<AuctionItem>, StoreError>;

    /// 경매 이벤트 조회
    async fn load_event(&self, event_id: i64) -> Result<AuctionEvent, StoreError>;
}

// endregion: --- Bid Store Trait

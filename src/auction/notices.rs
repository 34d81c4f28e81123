use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 커밋 이후 구독자(가격 표시, 상회 입찰 알림)에게 발행되는 변경 알림
/// 엔진은 발행만 하며 구독자 수명은 관리하지 않는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuctionNotice {
    // 입찰 확정 알림
    BidPlaced {
        item_id: i64,
        bidder_id: i64,
        amount: i64,
        new_minimum: i64,
        extended: bool,
        new_ends_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}

impl AuctionNotice {
    /// 파티셔닝 키 (상품 단위)
    pub fn key(&self) -> String {
        match self {
            AuctionNotice::BidPlaced { item_id, .. } => item_id.to_string(),
        }
    }
}

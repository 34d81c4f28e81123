/// 입찰 거부 사유 및 엔진 오류 분류
// region:    --- Imports
use thiserror::Error;

use crate::bidding::increment::TierError;

// endregion: --- Imports

// region:    --- Bid Rejection

/// 입찰 거부 사유 (닫힌 집합)
/// 모두 종결 상태이며 호출자에게 그대로 전달된다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BidRejection {
    #[error("인증되지 않은 요청입니다.")]
    Unauthenticated,
    #[error("차단된 계정입니다.")]
    Banned,
    #[error("입찰이 승인되지 않은 계정입니다.")]
    NotApproved,
    #[error("본인 출품 상품에는 입찰할 수 없습니다.")]
    SelfBid,
    #[error("경매가 아직 시작되지 않았습니다.")]
    NotStarted,
    #[error("경매가 이미 종료되었습니다.")]
    AlreadyEnded,
    #[error("입찰 금액이 최소 입찰가보다 낮습니다. (최소: {minimum})")]
    BidTooLow { minimum: i64 },
    #[error("호가 구간 설정 오류로 입찰이 중단되었습니다.")]
    IncrementConfig,
    #[error("최대 재시도 횟수 초과")]
    RetryExhausted,
}

impl BidRejection {
    /// 호출자용 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            BidRejection::Unauthenticated => "NOT_AUTHENTICATED",
            BidRejection::Banned => "BANNED",
            BidRejection::NotApproved => "NOT_APPROVED",
            BidRejection::SelfBid => "SELF_BID",
            BidRejection::NotStarted => "NOT_STARTED",
            BidRejection::AlreadyEnded => "ALREADY_ENDED",
            BidRejection::BidTooLow { .. } => "BID_TOO_LOW",
            BidRejection::IncrementConfig => "INCREMENT_CONFIG",
            BidRejection::RetryExhausted => "MAX_RETRIES_EXCEEDED",
        }
    }

    /// BID_TOO_LOW 인 경우 재시도에 필요한 최소 입찰가
    pub fn minimum(&self) -> Option<i64> {
        match self {
            BidRejection::BidTooLow { minimum } => Some(*minimum),
            _ => None,
        }
    }
}

impl From<TierError> for BidRejection {
    fn from(_: TierError) -> Self {
        BidRejection::IncrementConfig
    }
}

// endregion: --- Bid Rejection

// region:    --- Store Error

/// 저장소 계층 오류
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("상품을 찾을 수 없습니다. (id: {0})")]
    ItemNotFound(i64),
    #[error("경매 이벤트를 찾을 수 없습니다. (id: {0})")]
    EventNotFound(i64),
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),
}

// endregion: --- Store Error

// region:    --- Engine Error

/// 입찰 처리 결과 오류: 거부 또는 저장소 장애
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] BidRejection),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// endregion: --- Engine Error

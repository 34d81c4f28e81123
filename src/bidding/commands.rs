/// 입찰 커맨드 처리 (조정자)
/// 스냅샷 → 검증 → 소프트 클로즈 판정 → CAS 커밋을 충돌 시 재시도하며 수행한다.
// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::auction::notices::AuctionNotice;
use crate::bidding::error::{BidRejection, EngineError};
use crate::bidding::increment::IncrementSchedule;
use crate::bidding::soft_close;
use crate::bidding::validator;
use crate::config::BidPolicy;
use crate::identity::IdentityProvider;
use crate::message_broker::NoticePublisher;
use crate::store::{BidAttempt, BidStore, CommitOutcome};

// endregion: --- Imports

// region:    --- Commands

/// 입찰 명령
/// bidder_id 가 없으면 미인증 요청, amount 가 없으면 다음 최소가로 입찰(원클릭)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub item_id: i64,
    pub bidder_id: Option<i64>,
    pub amount: Option<i64>,
}

/// 수락 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidAccepted {
    pub amount: i64,
    pub new_minimum: i64,
    pub extended: bool,
    pub new_ends_at: Option<DateTime<Utc>>,
}

/// 입찰 처리
/// 검증 거부는 부수 효과 없이 즉시 반환하고, 커밋 충돌만 새 상태 기준으로 재시도한다.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    store: &dyn BidStore,
    identity: &dyn IdentityProvider,
    publisher: &dyn NoticePublisher,
    policy: &BidPolicy,
) -> Result<BidAccepted, EngineError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    let profile = match cmd.bidder_id {
        Some(bidder_id) => identity.resolve(bidder_id).await?,
        None => None,
    };

    let mut retries = 0;
    while retries < policy.commit_retries {
        let snapshot = store.bid_snapshot(cmd.item_id).await?;

        // 이벤트 호가 테이블이 없으면 플랫폼 기본 스케줄
        let schedule = match &snapshot.tiers {
            Some(rows) => IncrementSchedule::from_tiers(rows),
            None => Ok(policy.default_schedule.clone()),
        };
        if let Err(e) = &schedule {
            // 잘못된 설정은 운영자가 알아야 한다, 해당 이벤트 입찰은 전부 거부
            error!(
                "{:<12} --> 호가 구간 설정 오류 (event_id: {}): {}",
                "Command", snapshot.event.id, e
            );
        }

        let now = Utc::now();
        let highest = snapshot.top_bid.as_ref().map(|b| b.amount);

        let accepted = validator::validate(
            cmd.bidder_id,
            profile.as_ref(),
            &snapshot.item,
            &snapshot.event,
            schedule.as_ref(),
            highest,
            cmd.amount,
            now,
        )
        .map_err(EngineError::Rejected)?;

        // 검증을 통과했으면 Live, 종료 시각은 반드시 설정되어 있다
        let ends_at = match snapshot.event.ends_at {
            Some(ends_at) => ends_at,
            None => return Err(BidRejection::NotStarted.into()),
        };

        // 스냅샷의 종료 시각 기준으로 연장 판정, 커밋 시 같은 값이어야만 확정된다
        let (window, extend) = soft_close::effective_policy(&snapshot.event, policy);
        let new_ends_at = soft_close::maybe_extend(ends_at, window, extend, now);

        let attempt = BidAttempt {
            item_id: cmd.item_id,
            event_id: snapshot.event.id,
            bidder_id: accepted_bidder(&cmd)?,
            amount: accepted.amount,
            expected_top: highest,
            expected_ends_at: ends_at,
            new_ends_at,
        };

        match store.commit_bid(&attempt).await? {
            CommitOutcome::Committed(bid) => {
                info!(
                    "{:<12} --> 입찰 확정: item_id={}, amount={}, extended={}",
                    "Command",
                    bid.item_id,
                    bid.amount,
                    new_ends_at.is_some()
                );

                let notice = AuctionNotice::BidPlaced {
                    item_id: bid.item_id,
                    bidder_id: bid.bidder_id,
                    amount: bid.amount,
                    new_minimum: accepted.next_minimum,
                    extended: new_ends_at.is_some(),
                    new_ends_at,
                    at: bid.created_at,
                };
                // 발행 실패는 확정된 입찰에 영향을 주지 않는다
                if let Err(e) = publisher.publish(&notice).await {
                    warn!("{:<12} --> 알림 발행 실패: {}", "Command", e);
                }

                return Ok(BidAccepted {
                    amount: bid.amount,
                    new_minimum: accepted.next_minimum,
                    extended: new_ends_at.is_some(),
                    new_ends_at,
                });
            }
            CommitOutcome::Conflict => {
                warn!(
                    "{:<12} --> 커밋 충돌: 새 상태 기준으로 재시도 ({}/{})",
                    "Command",
                    retries + 1,
                    policy.commit_retries
                );
                retries += 1;
                continue;
            }
        }
    }

    Err(BidRejection::RetryExhausted.into())
}

fn accepted_bidder(cmd: &PlaceBidCommand) -> Result<i64, EngineError> {
    cmd.bidder_id
        .ok_or_else(|| EngineError::Rejected(BidRejection::Unauthenticated))
}

// endregion: --- Commands

// region:    --- Tests


// endregion: --- Tests

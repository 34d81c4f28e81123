/// 조회 측 핸들러
/// 표시용 읽기는 락 없이 수행되며 약간 낡은 값일 수 있다.
// region:    --- Imports
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::bidding::clock::{self, Phase};
use crate::bidding::error::{BidRejection, EngineError};
use crate::bidding::increment::IncrementSchedule;
use crate::bidding::model::{AuctionEvent, AuctionItem, Bid, BidState};
use crate::config::BidPolicy;
use crate::identity::IdentityProvider;
use crate::store::BidStore;

// endregion: --- Imports

// region:    --- Bid State

/// 상품 입찰 상태 조회
/// 단계는 저장된 status 가 아니라 타임스탬프에서 다시 계산한다.
pub async fn get_bid_state(
    store: &dyn BidStore,
    identity: &dyn IdentityProvider,
    policy: &BidPolicy,
    item_id: i64,
    caller: Option<i64>,
) -> Result<BidState, EngineError> {
    info!("{:<12} --> 입찰 상태 조회 id: {}", "Query", item_id);

    let snapshot = store.bid_snapshot(item_id).await?;

    let schedule = match &snapshot.tiers {
        Some(rows) => IncrementSchedule::from_tiers(rows)
            .map_err(|_| EngineError::Rejected(BidRejection::IncrementConfig))?,
        None => policy.default_schedule.clone(),
    };

    let highest = snapshot.top_bid.as_ref().map(|b| b.amount);
    let current_price = highest.unwrap_or(snapshot.item.starting_bid);
    let phase = clock::phase(snapshot.event.starts_at, snapshot.event.ends_at, Utc::now());

    let profile = match caller {
        Some(caller_id) => identity.resolve(caller_id).await?,
        None => None,
    };
    let is_caller_leading = match (caller, &snapshot.top_bid) {
        (Some(caller_id), Some(top)) => top.bidder_id == caller_id,
        _ => false,
    };
    let can_caller_bid = phase == Phase::Live
        && profile.as_ref().is_some_and(|p| p.approved && !p.banned)
        && !(caller.is_some() && snapshot.item.seller_id == caller);

    Ok(BidState {
        current_price,
        next_minimum_bid: schedule.next_minimum_bid(highest, snapshot.item.starting_bid),
        increment_step: schedule.increment_for(current_price),
        phase,
        ends_at: snapshot.event.ends_at,
        is_caller_leading,
        can_caller_bid,
    })
}

// endregion: --- Bid State

// region:    --- Display Reads

/// 이벤트 응답 (저장 행 + 도출된 단계)
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: AuctionEvent,
    pub phase: Phase,
}

/// 경매 이벤트 조회
pub async fn get_event(store: &dyn BidStore, event_id: i64) -> Result<EventView, EngineError> {
    info!("{:<12} --> 경매 이벤트 조회 id: {}", "Query", event_id);
    let event = store.load_event(event_id).await?;
    let phase = clock::phase(event.starts_at, event.ends_at, Utc::now());
    Ok(EventView { event, phase })
}

/// 상품 조회
pub async fn get_item(store: &dyn BidStore, item_id: i64) -> Result<AuctionItem, EngineError> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", item_id);
    Ok(store.load_item(item_id).await?)
}

/// 모든 상품 조회
pub async fn get_all_items(store: &dyn BidStore) -> Result<Vec<AuctionItem>, EngineError> {
    info!("{:<12} --> 모든 상품 조회", "Query");
    Ok(store.list_items().await?)
}

/// 입찰 이력 조회 (최신순)
pub async fn get_bid_history(
    store: &dyn BidStore,
    item_id: i64,
) -> Result<Vec<Bid>, EngineError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", item_id);
    // 존재하지 않는 상품은 빈 이력이 아니라 오류로 알린다
    store.load_item(item_id).await?;
    Ok(store.bid_history(item_id).await?)
}

// endregion: --- Display Reads

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryIdentityProvider;
    use crate::store::{BidAttempt, MemoryBidStore};
    use chrono::Duration;

    #[tokio::test]
    async fn bid_state_reports_leading_and_eligibility() {
        let store = MemoryBidStore::new();
        let identity = MemoryIdentityProvider::new();
        let policy = BidPolicy::default();

        let now = Utc::now();
        let event = store
            .create_event(
                "테스트 경매",
                Some(now - Duration::hours(1)),
                Some(now + Duration::hours(1)),
                None,
                None,
                None,
            )
            .await;
        let item = store
            .create_item(event.id, "테스트 상품", 100, Some(9))
            .await;
        identity.insert_profile(1, true, false).await;
        identity.insert_profile(2, true, false).await;
        identity.insert_profile(9, true, false).await;

        store
            .commit_bid(&BidAttempt {
                item_id: item.id,
                event_id: event.id,
                bidder_id: 1,
                amount: 100,
                expected_top: None,
                expected_ends_at: event.ends_at.unwrap(),
                new_ends_at: None,
            })
            .await
            .unwrap();

        let leading = get_bid_state(&store, &identity, &policy, item.id, Some(1))
            .await
            .unwrap();
        assert_eq!(leading.current_price, 100);
        assert_eq!(leading.next_minimum_bid, 105);
        assert_eq!(leading.increment_step, 5);
        assert_eq!(leading.phase, Phase::Live);
        assert!(leading.is_caller_leading);
        assert!(leading.can_caller_bid);

        // 상회 입찰이 필요한 호출자
        let outbid = get_bid_state(&store, &identity, &policy, item.id, Some(2))
            .await
            .unwrap();
        assert!(!outbid.is_caller_leading);
        assert!(outbid.can_caller_bid);

        // 판매자는 입찰 불가
        let seller = get_bid_state(&store, &identity, &policy, item.id, Some(9))
            .await
            .unwrap();
        assert!(!seller.can_caller_bid);

        // 익명 호출자는 조회만 가능
        let anonymous = get_bid_state(&store, &identity, &policy, item.id, None)
            .await
            .unwrap();
        assert!(!anonymous.is_caller_leading);
        assert!(!anonymous.can_caller_bid);
    }
}

// endregion: --- Tests

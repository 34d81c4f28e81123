/// 인메모리 입찰 원장 저장소 (테스트용)
/// Postgres 구현과 같은 CAS 커밋 의미론을 RwLock 으로 재현한다.
// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::bidding::error::StoreError;
use crate::bidding::model::{AuctionEvent, AuctionItem, Bid, IncrementTier};
use crate::store::{BidAttempt, BidSnapshot, BidStore, CommitOutcome};

// endregion: --- Imports

// region:    --- Memory Bid Store

#[derive(Default)]
struct Inner {
    events: HashMap<i64, AuctionEvent>,
    items: HashMap<i64, AuctionItem>,
    bids: HashMap<i64, Vec<Bid>>,
    tiers: HashMap<i64, Vec<IncrementTier>>,
    last_bid_at: HashMap<i64, DateTime<Utc>>,
    next_event_id: i64,
    next_item_id: i64,
    next_bid_id: i64,
}

#[derive(Default)]
pub struct MemoryBidStore {
    inner: RwLock<Inner>,
}

impl MemoryBidStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 테스트용 경매 이벤트 생성
    pub async fn create_event(
        &self,
        title: &str,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
        soft_close_window_secs: Option<i64>,
        soft_close_extend_secs: Option<i64>,
        increment_table_id: Option<i64>,
    ) -> AuctionEvent {
        let mut inner = self.inner.write().await;
        inner.next_event_id += 1;
        let event = AuctionEvent {
            id: inner.next_event_id,
            title: title.to_string(),
            status: "draft".to_string(),
            starts_at,
            ends_at,
            soft_close_window_secs,
            soft_close_extend_secs,
            increment_table_id,
            created_at: Utc::now(),
        };
        inner.events.insert(event.id, event.clone());
        event
    }

    /// 테스트용 상품 생성
    pub async fn create_item(
        &self,
        event_id: i64,
        title: &str,
        starting_bid: i64,
        seller_id: Option<i64>,
    ) -> AuctionItem {
        let mut inner = self.inner.write().await;
        inner.next_item_id += 1;
        let item = AuctionItem {
            id: inner.next_item_id,
            event_id,
            title: title.to_string(),
            description: String::new(),
            seller_id,
            status: "approved".to_string(),
            starting_bid,
            current_bid: None,
            created_at: Utc::now(),
        };
        inner.items.insert(item.id, item.clone());
        item
    }

    /// 테스트용 호가 구간 등록
    pub async fn set_tiers(&self, table_id: i64, bounds: Vec<(i64, Option<i64>, i64)>) {
        let mut inner = self.inner.write().await;
        let rows = bounds
            .into_iter()
            .map(|(min_amount, max_amount, increment)| IncrementTier {
                table_id,
                min_amount,
                max_amount,
                increment,
            })
            .collect();
        inner.tiers.insert(table_id, rows);
    }
}

fn top_bid_of(bids: &[Bid]) -> Option<&Bid> {
    // 동액은 유니크 제약으로 존재하지 않지만, 규약대로 먼저 생성된 입찰을 우선한다
    bids.iter().fold(None, |best: Option<&Bid>, b| match best {
        Some(cur) if cur.amount >= b.amount => Some(cur),
        _ => Some(b),
    })
}

#[async_trait]
impl BidStore for MemoryBidStore {
    async fn bid_snapshot(&self, item_id: i64) -> Result<BidSnapshot, StoreError> {
        let inner = self.inner.read().await;
        let item = inner
            .items
            .get(&item_id)
            .cloned()
            .ok_or(StoreError::ItemNotFound(item_id))?;
        let event = inner
            .events
            .get(&item.event_id)
            .cloned()
            .ok_or(StoreError::EventNotFound(item.event_id))?;
        let top_bid = inner
            .bids
            .get(&item_id)
            .and_then(|bids| top_bid_of(bids).cloned());
        let tiers = event
            .increment_table_id
            .map(|table_id| inner.tiers.get(&table_id).cloned().unwrap_or_default());

        Ok(BidSnapshot {
            item,
            event,
            top_bid,
            tiers,
        })
    }

    async fn commit_bid(&self, attempt: &BidAttempt) -> Result<CommitOutcome, StoreError> {
        // 쓰기 락이 Postgres 의 상품 행 잠금 역할을 한다
        let mut inner = self.inner.write().await;

        if !inner.items.contains_key(&attempt.item_id) {
            return Err(StoreError::ItemNotFound(attempt.item_id));
        }

        // 최고가 재확인
        let top = inner
            .bids
            .get(&attempt.item_id)
            .and_then(|bids| top_bid_of(bids).map(|b| b.amount));
        if top != attempt.expected_top {
            return Ok(CommitOutcome::Conflict);
        }

        // 종료 시각 재확인
        let ends_at = inner
            .events
            .get(&attempt.event_id)
            .ok_or(StoreError::EventNotFound(attempt.event_id))?
            .ends_at;
        if ends_at != Some(attempt.expected_ends_at) {
            return Ok(CommitOutcome::Conflict);
        }

        // 동일 금액 중복 차단 (유니크 제약 백스톱)
        if inner
            .bids
            .get(&attempt.item_id)
            .is_some_and(|bids| bids.iter().any(|b| b.amount == attempt.amount))
        {
            return Ok(CommitOutcome::Conflict);
        }

        // created_at 은 상품별로 단조 비감소
        let now = Utc::now();
        let created_at = match inner.last_bid_at.get(&attempt.item_id) {
            Some(last) if *last > now => *last,
            _ => now,
        };
        inner.last_bid_at.insert(attempt.item_id, created_at);

        inner.next_bid_id += 1;
        let bid = Bid {
            id: inner.next_bid_id,
            item_id: attempt.item_id,
            bidder_id: attempt.bidder_id,
            amount: attempt.amount,
            created_at,
        };
        inner
            .bids
            .entry(attempt.item_id)
            .or_default()
            .push(bid.clone());

        // 미러 갱신
        if let Some(item) = inner.items.get_mut(&attempt.item_id) {
            item.current_bid = Some(attempt.amount);
        }

        // 종료 시각은 뒤로만 이동
        if let Some(new_end) = attempt.new_ends_at {
            if let Some(event) = inner.events.get_mut(&attempt.event_id) {
                event.ends_at = match event.ends_at {
                    Some(cur) if cur >= new_end => Some(cur),
                    _ => Some(new_end),
                };
            }
        }

        Ok(CommitOutcome::Committed(bid))
    }

    async fn bid_history(&self, item_id: i64) -> Result<Vec<Bid>, StoreError> {
        let inner = self.inner.read().await;
        let mut bids = inner.bids.get(&item_id).cloned().unwrap_or_default();
        bids.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(bids)
    }

    async fn load_item(&self, item_id: i64) -> Result<AuctionItem, StoreError> {
        let inner = self.inner.read().await;
        inner
            .items
            .get(&item_id)
            .cloned()
            .ok_or(StoreError::ItemNotFound(item_id))
    }

    async fn list_items(&self) -> Result<Vec<AuctionItem>, StoreError> {
        let inner = self.inner.read().await;
        let mut items: Vec<_> = inner.items.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn load_event(&self, event_id: i64) -> Result<AuctionEvent, StoreError> {
        let inner = self.inner.read().await;
        inner
            .events
            .get(&event_id)
            .cloned()
            .ok_or(StoreError::EventNotFound(event_id))
    }
}

// endregion: --- Memory Bid Store

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn seed(store: &MemoryBidStore) -> (AuctionEvent, AuctionItem) {
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
        let item = store.create_item(event.id, "테스트 상품", 100, None).await;
        (event, item)
    }

    fn attempt(event: &AuctionEvent, item: &AuctionItem, amount: i64) -> BidAttempt {
        BidAttempt {
            item_id: item.id,
            event_id: event.id,
            bidder_id: 1,
            amount,
            expected_top: None,
            expected_ends_at: event.ends_at.unwrap(),
            new_ends_at: None,
        }
    }

    #[tokio::test]
    async fn commit_appends_bid_and_reconciles_mirror() {
        let store = MemoryBidStore::new();
        let (event, item) = seed(&store).await;

        let outcome = store.commit_bid(&attempt(&event, &item, 100)).await.unwrap();
        assert!(matches!(outcome, CommitOutcome::Committed(_)));

        let snapshot = store.bid_snapshot(item.id).await.unwrap();
        assert_eq!(snapshot.item.current_bid, Some(100));
        assert_eq!(snapshot.top_bid.unwrap().amount, 100);
    }

    #[tokio::test]
    async fn stale_expected_top_conflicts_without_side_effects() {
        let store = MemoryBidStore::new();
        let (event, item) = seed(&store).await;

        store.commit_bid(&attempt(&event, &item, 100)).await.unwrap();

        // 첫 입찰 이전의 스냅샷을 기준으로 한 커밋
        let outcome = store.commit_bid(&attempt(&event, &item, 105)).await.unwrap();
        assert!(matches!(outcome, CommitOutcome::Conflict));

        let history = store.bid_history(item.id).await.unwrap();
        assert_eq!(history.len(), 1);
        let snapshot = store.bid_snapshot(item.id).await.unwrap();
        assert_eq!(snapshot.item.current_bid, Some(100));
    }

    #[tokio::test]
    async fn stale_ends_at_conflicts() {
        let store = MemoryBidStore::new();
        let (event, item) = seed(&store).await;

        let mut stale = attempt(&event, &item, 100);
        stale.expected_ends_at = event.ends_at.unwrap() + Duration::seconds(30);
        let outcome = store.commit_bid(&stale).await.unwrap();
        assert!(matches!(outcome, CommitOutcome::Conflict));
    }

    #[tokio::test]
    async fn duplicate_amount_conflicts() {
        let store = MemoryBidStore::new();
        let (event, item) = seed(&store).await;

        store.commit_bid(&attempt(&event, &item, 100)).await.unwrap();

        let mut dup = attempt(&event, &item, 100);
        dup.expected_top = Some(100);
        let outcome = store.commit_bid(&dup).await.unwrap();
        assert!(matches!(outcome, CommitOutcome::Conflict));
    }

    #[tokio::test]
    async fn ends_at_only_moves_forward() {
        let store = MemoryBidStore::new();
        let (event, item) = seed(&store).await;
        let original_end = event.ends_at.unwrap();

        let mut extend = attempt(&event, &item, 100);
        extend.new_ends_at = Some(original_end + Duration::seconds(120));
        store.commit_bid(&extend).await.unwrap();

        let extended = store.load_event(event.id).await.unwrap().ends_at.unwrap();
        assert_eq!(extended, original_end + Duration::seconds(120));

        // 더 이른 종료 시각을 쓰려는 시도는 무시된다
        let mut backward = attempt(&event, &item, 105);
        backward.expected_top = Some(100);
        backward.expected_ends_at = extended;
        backward.new_ends_at = Some(original_end);
        store.commit_bid(&backward).await.unwrap();

        assert_eq!(
            store.load_event(event.id).await.unwrap().ends_at.unwrap(),
            extended
        );
    }

    #[tokio::test]
    async fn created_at_is_monotonic_and_history_is_newest_first() {
        let store = MemoryBidStore::new();
        let (event, item) = seed(&store).await;

        let mut expected_top = None;
        for amount in [100, 105, 110, 120] {
            let mut a = attempt(&event, &item, amount);
            a.expected_top = expected_top;
            let outcome = store.commit_bid(&a).await.unwrap();
            assert!(matches!(outcome, CommitOutcome::Committed(_)));
            expected_top = Some(amount);
        }

        let history = store.bid_history(item.id).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].amount, 120);
        for pair in history.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
            assert!(pair[0].amount > pair[1].amount);
        }
    }
}

// endregion: --- Tests

/// Postgres 입찰 원장 저장소
/// 상품 행 잠금 + 기대값 재확인(CAS)으로 같은 상품의 입찰을 직렬화한다.
// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tracing::{info, warn};

use crate::bidding::error::StoreError;
use crate::bidding::model::{AuctionEvent, AuctionItem, Bid, IncrementTier};
use crate::query::queries;
use crate::store::{BidAttempt, BidSnapshot, BidStore, CommitOutcome};

// endregion: --- Imports

// region:    --- Postgres Bid Store

pub struct PostgresBidStore {
    pool: Arc<PgPool>,
}

impl PostgresBidStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// 커넥션 풀 생성
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// 데이터베이스 풀 가져오기
    pub fn pool(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    /// 스키마 초기화
    /// recreate 가 true 면 기존 테이블을 지우고 다시 만든다.
    pub async fn initialize_schema(&self, recreate: bool) -> Result<(), sqlx::Error> {
        if recreate {
            warn!("{:<12} --> 데이터베이스 재생성", "Store");
            let recreate_sql = include_str!("../sql/00-recreate-db.sql");
            self.execute_multi_query(recreate_sql).await?;
        }

        let schema_sql = include_str!("../sql/01-create-schema.sql");
        self.execute_multi_query(schema_sql).await?;
        info!("{:<12} --> 스키마 초기화 완료", "Store");
        Ok(())
    }

    /// 여러 쿼리 실행
    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&*self.pool).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BidStore for PostgresBidStore {
    async fn bid_snapshot(&self, item_id: i64) -> Result<BidSnapshot, StoreError> {
        // 하나의 트랜잭션으로 일관된 스냅샷을 읽는다 (행 잠금 없음)
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, AuctionItem>(queries::GET_ITEM)
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::ItemNotFound(item_id))?;

        let event = sqlx::query_as::<_, AuctionEvent>(queries::GET_EVENT)
            .bind(item.event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::EventNotFound(item.event_id))?;

        let top_bid = sqlx::query_as::<_, Bid>(queries::GET_TOP_BID)
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;

        let tiers = match event.increment_table_id {
            Some(table_id) => Some(
                sqlx::query_as::<_, IncrementTier>(queries::GET_TIERS)
                    .bind(table_id)
                    .fetch_all(&mut *tx)
                    .await?,
            ),
            None => None,
        };

        tx.commit().await?;

        Ok(BidSnapshot {
            item,
            event,
            top_bid,
            tiers,
        })
    }

    async fn commit_bid(&self, attempt: &BidAttempt) -> Result<CommitOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // 상품 행 잠금: 같은 상품에 대한 커밋 경로는 여기서 직렬화된다
        sqlx::query(queries::LOCK_ITEM)
            .bind(attempt.item_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::ItemNotFound(attempt.item_id))?;

        // 최고가 재확인: 스냅샷 이후 다른 입찰이 확정됐으면 충돌
        let top: Option<i64> = sqlx::query_scalar(queries::GET_TOP_AMOUNT)
            .bind(attempt.item_id)
            .fetch_one(&mut *tx)
            .await?;
        if top != attempt.expected_top {
            tx.rollback().await?;
            return Ok(CommitOutcome::Conflict);
        }

        // 이벤트 행 잠금 + 종료 시각 재확인: 낡은 종료 시각 기준의 연장 판정을 차단
        let ends_at: Option<DateTime<Utc>> = sqlx::query_scalar(queries::LOCK_EVENT_ENDS_AT)
            .bind(attempt.event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::EventNotFound(attempt.event_id))?;
        if ends_at != Some(attempt.expected_ends_at) {
            tx.rollback().await?;
            return Ok(CommitOutcome::Conflict);
        }

        // 입찰 추가 (같은 금액이 먼저 들어왔으면 유니크 제약이 잡는다)
        let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
            .bind(attempt.item_id)
            .bind(attempt.bidder_id)
            .bind(attempt.amount)
            .fetch_optional(&mut *tx)
            .await?;
        let bid = match bid {
            Some(bid) => bid,
            None => {
                tx.rollback().await?;
                return Ok(CommitOutcome::Conflict);
            }
        };

        // 미러 갱신
        sqlx::query(queries::UPDATE_CURRENT_BID)
            .bind(attempt.amount)
            .bind(attempt.item_id)
            .execute(&mut *tx)
            .await?;

        // 소프트 클로즈 연장 (GREATEST 로 종료 시각은 뒤로만 이동)
        if let Some(new_end) = attempt.new_ends_at {
            sqlx::query(queries::EXTEND_EVENT)
                .bind(new_end)
                .bind(attempt.event_id)
                .execute(&mut *tx)
                .await?;
        }

        // 입찰·미러·연장을 하나의 작업 단위로 커밋
        tx.commit().await?;
        Ok(CommitOutcome::Committed(bid))
    }

    async fn bid_history(&self, item_id: i64) -> Result<Vec<Bid>, StoreError> {
        let bids = sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
            .bind(item_id)
            .fetch_all(&*self.pool)
            .await?;
        Ok(bids)
    }

    async fn load_item(&self, item_id: i64) -> Result<AuctionItem, StoreError> {
        sqlx::query_as::<_, AuctionItem>(queries::GET_ITEM)
            .bind(item_id)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or(StoreError::ItemNotFound(item_id))
    }

    async fn list_items(&self) -> Result<Vec<AuctionItem>, StoreError> {
        let items = sqlx::query_as::<_, AuctionItem>(queries::GET_ALL_ITEMS)
            .fetch_all(&*self.pool)
            .await?;
        Ok(items)
    }

    async fn load_event(&self, event_id: i64) -> Result<AuctionEvent, StoreError> {
        sqlx::query_as::<_, AuctionEvent>(queries::GET_EVENT)
            .bind(event_id)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or(StoreError::EventNotFound(event_id))
    }
}

// endregion: --- Postgres Bid Store

/// 경매 이벤트 status 캐시 갱신 스케줄러
/// 목록/필터가 status 컬럼을 바로 쓸 수 있도록 타임스탬프에서 다시 써 준다.
/// 캐시 갱신일 뿐이며 입찰 경로는 이 컬럼을 읽지 않는다.
// region:    --- Imports
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error};

// endregion: --- Imports

// region:    --- Auction Scheduler

pub struct AuctionScheduler {
    pool: Arc<PgPool>,
}

impl AuctionScheduler {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// 스케줄러 시작 (1초 주기)
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                if let Err(e) = Self::refresh_status_cache(&pool).await {
                    error!(
                        "{:<12} --> 경매 상태 캐시 갱신 중 오류 발생: {:?}",
                        "Scheduler", e
                    );
                }
            }
        });
    }

    /// status 캐시 갱신
    async fn refresh_status_cache(pool: &PgPool) -> Result<(), sqlx::Error> {
        let now = Utc::now();

        // 시각 미설정 -> draft
        sqlx::query(
            "UPDATE auction_events SET status = 'draft'
             WHERE (starts_at IS NULL OR ends_at IS NULL) AND status != 'draft'",
        )
        .execute(pool)
        .await?;

        // 시작 전 -> scheduled
        sqlx::query(
            "UPDATE auction_events SET status = 'scheduled'
             WHERE starts_at IS NOT NULL AND ends_at IS NOT NULL
               AND starts_at > $1 AND status != 'scheduled'",
        )
        .bind(now)
        .execute(pool)
        .await?;

        // 진행 중 -> live
        sqlx::query(
            "UPDATE auction_events SET status = 'live'
             WHERE starts_at IS NOT NULL AND ends_at IS NOT NULL
               AND starts_at <= $1 AND ends_at >= $1 AND status != 'live'",
        )
        .bind(now)
        .execute(pool)
        .await?;

        // 종료 후 -> ended
        sqlx::query(
            "UPDATE auction_events SET status = 'ended'
             WHERE ends_at IS NOT NULL AND ends_at < $1 AND status != 'ended'",
        )
        .bind(now)
        .execute(pool)
        .await?;

        debug!(
            "{:<12} --> 경매 상태 캐시가 성공적으로 갱신되었습니다.",
            "Scheduler"
        );

        Ok(())
    }
}

// endregion: --- Auction Scheduler

/// 인증/승인 제공자 경계
/// 자격 증명 관리는 외부 시스템 소유이며 여기서는 프로필 플래그만 읽는다.
// region:    --- Imports
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::bidding::error::StoreError;
use crate::bidding::model::BidderProfile;
use crate::query::queries;

// endregion: --- Imports

// region:    --- Identity Provider Trait

/// 입찰자 프로필 조회 트레이트
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 프로필 조회 (미등록 사용자는 None)
    async fn resolve(&self, bidder_id: i64) -> Result<Option<BidderProfile>, StoreError>;
}

// endregion: --- Identity Provider Trait

// region:    --- Postgres Identity Provider

pub struct PostgresIdentityProvider {
    pool: Arc<PgPool>,
}

impl PostgresIdentityProvider {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for PostgresIdentityProvider {
    async fn resolve(&self, bidder_id: i64) -> Result<Option<BidderProfile>, StoreError> {
        let profile = sqlx::query_as::<_, BidderProfile>(queries::GET_PROFILE)
            .bind(bidder_id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(profile)
    }
}

// endregion: --- Postgres Identity Provider

// region:    --- Memory Identity Provider

/// 인메모리 프로필 저장소 (테스트용)
#[derive(Default)]
pub struct MemoryIdentityProvider {
    profiles: RwLock<HashMap<i64, BidderProfile>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 테스트용 프로필 등록
    pub async fn insert_profile(&self, id: i64, approved: bool, banned: bool) {
        self.profiles
            .write()
            .await
            .insert(id, BidderProfile { id, approved, banned });
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn resolve(&self, bidder_id: i64) -> Result<Option<BidderProfile>, StoreError> {
        Ok(self.profiles.read().await.get(&bidder_id).cloned())
    }
}

// endregion: --- Memory Identity Provider

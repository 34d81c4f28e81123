// region:    --- Imports
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use tartami_bidding::config::Config;
use tartami_bidding::handlers::{routes, AppState};
use tartami_bidding::identity::PostgresIdentityProvider;
use tartami_bidding::message_broker::{KafkaManager, KafkaNoticePublisher};
use tartami_bidding::scheduler::AuctionScheduler;
use tartami_bidding::store::PostgresBidStore;

// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = Config::from_env()?;

    // 저장소 생성 및 스키마 초기화
    let store = Arc::new(PostgresBidStore::connect(&config.database_url).await?);
    if let Err(e) = store.initialize_schema(config.recreate_db).await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // Kafka 매니저 생성 및 초기화
    let kafka_manager = KafkaManager::new(&config.kafka_brokers)?;
    if let Err(e) = kafka_manager.initialize().await {
        error!("{:<12} --> Kafka 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> Kafka 초기화 성공", "Main");

    // 알림 토픽 생성
    kafka_manager.create_topic(&config.notice_topic, 5, 1).await?;

    // 상태 캐시 갱신 스케줄러 시작
    let scheduler = AuctionScheduler::new(store.pool());
    scheduler.start().await;

    // 상태 구성
    let identity = Arc::new(PostgresIdentityProvider::new(store.pool()));
    let publisher = Arc::new(KafkaNoticePublisher::new(
        kafka_manager.get_producer(),
        config.notice_topic.clone(),
    ));
    let state = AppState {
        store,
        identity,
        publisher,
        policy: Arc::new(config.policy.clone()),
    };

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes(state).into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main

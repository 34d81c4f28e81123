/// 변경 알림 발행 경계
/// 커밋된 입찰을 상품 id 를 키로 Kafka 토픽에 내보낸다. 엔진은 발행만 한다.
// region:    --- Imports
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::auction::notices::AuctionNotice;

// endregion: --- Imports

// region:    --- Notify Error

/// 알림 발행 실패
/// 확정된 입찰에는 영향을 주지 않으며 로그로만 남긴다.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("알림 직렬화 실패: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("알림 전송 실패: {0}")]
    Transport(String),
}

// endregion: --- Notify Error

// region:    --- Notice Publisher Trait

/// 변경 알림 발행 트레이트
#[async_trait]
pub trait NoticePublisher: Send + Sync {
    async fn publish(&self, notice: &AuctionNotice) -> Result<(), NotifyError>;
}

// endregion: --- Notice Publisher Trait

// region:    --- Kafka Producer

#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
}

/// KafkaProducer 구현
impl KafkaProducer {
    pub fn new(brokers: &str) -> Result<Self, String> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| format!("Producer 생성 실패: {:?}", e))?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
        })
    }

    /// 메시지 전송
    pub async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), String> {
        info!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}",
            "Producer", topic, key
        );
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer
            .send(record, std::time::Duration::from_secs(0))
            .await
            .map_err(|(e, _)| format!("메시지 전송 오류: {:?}", e))?;

        Ok(())
    }
}

// endregion: --- Kafka Producer

// region:    --- Kafka Notice Publisher

/// Kafka 기반 알림 발행자
pub struct KafkaNoticePublisher {
    producer: Arc<KafkaProducer>,
    topic: String,
}

impl KafkaNoticePublisher {
    pub fn new(producer: Arc<KafkaProducer>, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl NoticePublisher for KafkaNoticePublisher {
    async fn publish(&self, notice: &AuctionNotice) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(notice)?;
        self.producer
            .send_message(&self.topic, &notice.key(), &payload)
            .await
            .map_err(NotifyError::Transport)
    }
}

// endregion: --- Kafka Notice Publisher

// region:    --- Kafka Manager

pub struct KafkaManager {
    producer: Arc<KafkaProducer>,
    brokers: String,
}

/// KafkaManager 구현
impl KafkaManager {
    pub fn new(brokers: &str) -> Result<Self, String> {
        let producer = Arc::new(KafkaProducer::new(brokers)?);
        Ok(KafkaManager {
            producer,
            brokers: brokers.to_string(),
        })
    }

    /// 프로듀서 반환
    pub fn get_producer(&self) -> Arc<KafkaProducer> {
        Arc::clone(&self.producer)
    }

    /// Kafka 초기화: 핑 메시지로 브로커 연결을 확인한다
    pub async fn initialize(&self) -> Result<(), String> {
        info!("{:<12} --> Kafka 초기화 시작", "Manager");
        self.producer
            .send_message("init-topic", "init-key", "init-message")
            .await?;
        info!("{:<12} --> Kafka 초기화 성공", "Manager");
        Ok(())
    }

    /// 토픽 생성
    pub async fn create_topic(
        &self,
        topic_name: &str,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), String> {
        info!("{:<12} --> Kafka 토픽 생성 시작: {}", "Manager", topic_name);

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()
            .map_err(|e| format!("AdminClient 생성 실패: {:?}", e))?;

        let new_topic = NewTopic::new(
            topic_name,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );

        match admin_client
            .create_topics(&[new_topic], &AdminOptions::new())
            .await
        {
            Ok(_) => {
                info!("{:<12} --> Kafka 토픽 생성 성공: {}", "Manager", topic_name);
                Ok(())
            }
            Err(e) => {
                error!("{:<12} --> Kafka 토픽 생성 실패: {:?}", "Manager", e);
                Err(format!("토픽 생성 실패: {:?}", e))
            }
        }
    }
}

// endregion: --- Kafka Manager

// region:    --- Memory Notice Publisher

/// 발행된 알림을 쌓아 두는 인메모리 발행자 (테스트용)
#[derive(Default)]
pub struct MemoryNoticePublisher {
    notices: Mutex<Vec<AuctionNotice>>,
}

impl MemoryNoticePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 발행된 알림
    pub async fn published(&self) -> Vec<AuctionNotice> {
        self.notices.lock().await.clone()
    }
}

#[async_trait]
impl NoticePublisher for MemoryNoticePublisher {
    async fn publish(&self, notice: &AuctionNotice) -> Result<(), NotifyError> {
        self.notices.lock().await.push(notice.clone());
        Ok(())
    }
}

// endregion: --- Memory Notice Publisher

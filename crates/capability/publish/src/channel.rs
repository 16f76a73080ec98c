//! 集群共享的发布通道。
//!
//! 所有发射器持有同一个 `Arc<PublishChannel>`。每次尝试单独持锁，
//! 重试等待期间不占用锁，其他发射器的发布可以穿插进行。

use crate::error::{PublishError, TransportError};
use crate::retry::{Attempted, RetryError, RetryPolicy};
use crate::transport::{BrokerTransport, Qos};
use domain::{Reading, encode_reading};
use ems_telemetry::{record_publish_failure, record_publish_retry, record_publish_success};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 一次成功发布的回执。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReceipt {
    pub attempts: u32,
    pub payload_size: usize,
}

pub struct PublishChannel {
    transport: Arc<dyn BrokerTransport>,
    gate: Mutex<()>,
    connect_policy: RetryPolicy,
    publish_policy: RetryPolicy,
    qos: Qos,
    closed: AtomicBool,
}

impl PublishChannel {
    pub fn new(transport: Arc<dyn BrokerTransport>) -> Self {
        Self::with_policies(
            transport,
            RetryPolicy::connect_default(),
            RetryPolicy::publish_default(),
        )
    }

    pub fn with_policies(
        transport: Arc<dyn BrokerTransport>,
        connect_policy: RetryPolicy,
        publish_policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            gate: Mutex::new(()),
            connect_policy,
            publish_policy,
            qos: Qos::default(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_qos(mut self, qos: Qos) -> Self {
        self.qos = qos;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 按建连策略建立连接，返回消耗的尝试次数。
    pub async fn connect(
        &self,
        cancel: &CancellationToken,
    ) -> Result<u32, RetryError<TransportError>> {
        let transport = self.transport.as_ref();
        let gate = &self.gate;
        let outcome = self
            .connect_policy
            .run("connect", cancel, move |attempt| async move {
                info!(target: "ems.publish", attempt, "broker_connect_attempt");
                let _guard = gate.lock().await;
                transport.connect().await
            })
            .await?;
        info!(target: "ems.publish", attempts = outcome.attempts, "broker_connected");
        Ok(outcome.attempts)
    }

    /// 编码并按通道默认 QoS 发布一条读数；重试耗尽后返回错误，不影响其他发射器。
    pub async fn publish(
        &self,
        topic: &str,
        reading: Reading,
        cancel: &CancellationToken,
    ) -> Result<PublishReceipt, PublishError> {
        self.publish_with_qos(topic, reading, self.qos, cancel).await
    }

    /// 以指定 QoS 发布一条读数。
    pub async fn publish_with_qos(
        &self,
        topic: &str,
        reading: Reading,
        qos: Qos,
        cancel: &CancellationToken,
    ) -> Result<PublishReceipt, PublishError> {
        if self.is_closed() {
            return Err(PublishError::Closed);
        }
        let payload = encode_reading(&reading)?;
        let payload_size = payload.len();
        let transport = self.transport.as_ref();
        let gate = &self.gate;
        let payload = &payload;
        let outcome = self
            .publish_policy
            .run("publish", cancel, move |attempt| async move {
                if attempt > 1 {
                    record_publish_retry();
                }
                let _guard = gate.lock().await;
                transport.publish(topic, payload.clone(), qos).await
            })
            .await;
        match outcome {
            Ok(Attempted { attempts, .. }) => {
                record_publish_success();
                info!(
                    target: "ems.publish",
                    topic = %topic,
                    device_id = %reading.device_id(),
                    attempts,
                    payload_size,
                    "reading_published"
                );
                Ok(PublishReceipt {
                    attempts,
                    payload_size,
                })
            }
            Err(err) => {
                if !err.is_cancelled() {
                    record_publish_failure();
                }
                warn!(
                    target: "ems.publish",
                    topic = %topic,
                    device_id = %reading.device_id(),
                    attempts = err.attempts(),
                    error = %err,
                    "reading_publish_failed"
                );
                Err(PublishError::Transport(err))
            }
        }
    }

    /// 断开连接；只有第一次调用真正执行，返回是否由本次调用完成断开。
    pub async fn disconnect(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let _guard = self.gate.lock().await;
        match self.transport.disconnect().await {
            Ok(()) => info!(target: "ems.publish", "broker_disconnected"),
            Err(err) => warn!(target: "ems.publish", error = %err, "broker_disconnect_failed"),
        }
        true
    }
}

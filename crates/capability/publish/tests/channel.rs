use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domain::{Reading, SensorType, decode_reading};
use ems_publish::{
    BrokerTransport, PublishChannel, PublishError, Qos, RetryError, RetryPolicy, TransportError,
};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio_util::sync::CancellationToken;

/// 前 `fail_publishes` 次发布失败、前 `fail_connects` 次建连失败的假传输。
#[derive(Default)]
struct FlakyTransport {
    fail_connects: u32,
    fail_publishes: u32,
    connect_calls: AtomicU32,
    publish_calls: AtomicU32,
    disconnect_calls: AtomicU32,
    published: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FlakyTransport {
    fn failing_publishes(count: u32) -> Self {
        Self {
            fail_publishes: count,
            ..Self::default()
        }
    }

    fn failing_connects(count: u32) -> Self {
        Self {
            fail_connects: count,
            ..Self::default()
        }
    }
}

#[async_trait]
impl BrokerTransport for FlakyTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let call = self.connect_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.fail_connects {
            return Err(TransportError::Connect("broker unreachable".to_string()));
        }
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        _qos: Qos,
    ) -> Result<(), TransportError> {
        let call = self.publish_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.fail_publishes {
            return Err(TransportError::Publish("broker busy".to_string()));
        }
        self.published
            .lock()
            .expect("lock")
            .push((topic.to_string(), payload));
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn sample_reading() -> Reading {
    Reading::new(
        "unit_1_hvac",
        SensorType::Hvac,
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        [("hvac_runtime_minutes", 42.0), ("hvac_power_kw", 1.75)],
    )
    .expect("reading")
    .with_unit(1)
}

#[tokio::test(start_paused = true)]
async fn publish_succeeds_on_third_attempt() {
    let transport = Arc::new(FlakyTransport::failing_publishes(2));
    let channel = PublishChannel::new(transport.clone());
    let cancel = CancellationToken::new();

    let receipt = channel
        .publish("ems/unit/1/hvac", sample_reading(), &cancel)
        .await
        .expect("published");

    assert_eq!(receipt.attempts, 3);
    assert_eq!(transport.publish_calls.load(Ordering::SeqCst), 3);
    let published = transport.published.lock().expect("lock");
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "ems/unit/1/hvac");
    let decoded = decode_reading(&published[0].1).expect("decode");
    assert_eq!(decoded.device_id(), "unit_1_hvac");
    assert_eq!(decoded.unit_id(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn publish_gives_up_after_three_attempts() {
    let transport = Arc::new(FlakyTransport::failing_publishes(3));
    let channel = PublishChannel::new(transport.clone());
    let cancel = CancellationToken::new();

    let err = channel
        .publish("ems/unit/1/hvac", sample_reading(), &cancel)
        .await
        .expect_err("exhausted");

    assert!(matches!(
        err,
        PublishError::Transport(RetryError::Exhausted { attempts: 3, .. })
    ));
    assert_eq!(transport.publish_calls.load(Ordering::SeqCst), 3);
    assert!(transport.published.lock().expect("lock").is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_publish_retries() {
    let transport = Arc::new(FlakyTransport::failing_publishes(10));
    let channel = PublishChannel::new(transport.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = channel
        .publish("ems/unit/1/hvac", sample_reading(), &cancel)
        .await
        .expect_err("cancelled");

    assert!(matches!(
        err,
        PublishError::Transport(RetryError::Cancelled { attempts: 1 })
    ));
    assert_eq!(transport.publish_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn connect_retries_with_backoff() {
    let transport = Arc::new(FlakyTransport::failing_connects(3));
    let channel = PublishChannel::new(transport.clone());
    let cancel = CancellationToken::new();
    let started = tokio::time::Instant::now();

    let attempts = channel.connect(&cancel).await.expect("connected");

    assert_eq!(attempts, 4);
    // 1s + 2s + 4s
    assert!(started.elapsed() >= std::time::Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn connect_fails_after_five_attempts() {
    let transport = Arc::new(FlakyTransport::failing_connects(5));
    let channel = PublishChannel::new(transport.clone());
    let cancel = CancellationToken::new();

    let err = channel.connect(&cancel).await.expect_err("exhausted");

    assert!(matches!(err, RetryError::Exhausted { attempts: 5, .. }));
    assert_eq!(transport.connect_calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn refused_connection_is_not_retried() {
    struct RefusingTransport(AtomicU32);

    #[async_trait]
    impl BrokerTransport for RefusingTransport {
        async fn connect(&self) -> Result<(), TransportError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::Refused("NotAuthorized".to_string()))
        }
        async fn publish(&self, _: &str, _: Vec<u8>, _: Qos) -> Result<(), TransportError> {
            Ok(())
        }
        async fn disconnect(&self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    let transport = Arc::new(RefusingTransport(AtomicU32::new(0)));
    let channel = PublishChannel::with_policies(
        transport.clone(),
        RetryPolicy::connect_default(),
        RetryPolicy::publish_default(),
    );
    let err = channel
        .connect(&CancellationToken::new())
        .await
        .expect_err("refused");

    assert!(matches!(err, RetryError::Fatal { attempts: 1, .. }));
    assert_eq!(transport.0.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn disconnect_runs_once_and_closes_channel() {
    let transport = Arc::new(FlakyTransport::default());
    let channel = PublishChannel::new(transport.clone());

    assert!(channel.disconnect().await);
    assert!(!channel.disconnect().await);
    assert_eq!(transport.disconnect_calls.load(Ordering::SeqCst), 1);

    let err = channel
        .publish("ems/unit/1/hvac", sample_reading(), &CancellationToken::new())
        .await
        .expect_err("closed");
    assert!(matches!(err, PublishError::Closed));
}

/// 按主题决定成败的假传输，记录成功发布的主题与 QoS。
#[derive(Default)]
struct TopicGatedTransport {
    accepted: Mutex<Vec<(String, Qos)>>,
}

#[async_trait]
impl BrokerTransport for TopicGatedTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        _payload: Vec<u8>,
        qos: Qos,
    ) -> Result<(), TransportError> {
        if topic.ends_with("/bad") {
            return Err(TransportError::Publish("rejected".to_string()));
        }
        self.accepted
            .lock()
            .expect("lock")
            .push((topic.to_string(), qos));
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn failing_publish_does_not_block_other_publishers() {
    let transport = Arc::new(TopicGatedTransport::default());
    let channel = Arc::new(PublishChannel::new(transport.clone()));
    let cancel = CancellationToken::new();
    let started = tokio::time::Instant::now();

    let failing = {
        let channel = channel.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let result = channel.publish("ems/unit/1/bad", sample_reading(), &cancel).await;
            (result, started.elapsed())
        })
    };

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let receipt = channel
        .publish("ems/unit/1/good", sample_reading(), &cancel)
        .await
        .expect("published");
    let good_elapsed = started.elapsed();

    assert_eq!(receipt.attempts, 1);
    assert!(good_elapsed < std::time::Duration::from_secs(1));
    assert!(!failing.is_finished());

    let (result, bad_elapsed) = failing.await.expect("join");
    assert!(matches!(
        result,
        Err(PublishError::Transport(RetryError::Exhausted { attempts: 3, .. }))
    ));
    assert!(bad_elapsed >= std::time::Duration::from_secs(2));
    assert!(bad_elapsed > good_elapsed);
}

#[tokio::test]
async fn per_call_qos_overrides_channel_default() {
    let transport = Arc::new(TopicGatedTransport::default());
    let channel = PublishChannel::new(transport.clone()).with_qos(Qos::AtMostOnce);
    let cancel = CancellationToken::new();

    channel
        .publish("ems/unit/1/hvac", sample_reading(), &cancel)
        .await
        .expect("default qos");
    channel
        .publish_with_qos("ems/unit/1/hvac", sample_reading(), Qos::AtLeastOnce, &cancel)
        .await
        .expect("explicit qos");

    let accepted = transport.accepted.lock().expect("lock");
    assert_eq!(
        accepted.iter().map(|(_, qos)| *qos).collect::<Vec<_>>(),
        vec![Qos::AtMostOnce, Qos::AtLeastOnce]
    );
}

//! 集群编排：建连 → 错峰启动发射器 → 等待取消 → 汇合 → 断开。

use crate::emitter::{Emitter, EmitterSpec, EmitterStats};
use ems_publish::{PublishChannel, RetryError, TransportError};
use ems_telemetry::metrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 集群运行错误。
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("broker connection failed: {0}")]
    Connect(#[source] RetryError<TransportError>),
}

/// 集群退出时的汇总。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetReport {
    pub emitters: usize,
    pub ticks: u64,
    pub published: u64,
    pub failed: u64,
    /// 以 panic 结束的发射器任务数。
    pub aborted: usize,
}

impl FleetReport {
    fn absorb(&mut self, stats: EmitterStats) {
        self.ticks += stats.ticks;
        self.published += stats.published;
        self.failed += stats.failed;
    }
}

pub struct FleetOrchestrator {
    channel: Arc<PublishChannel>,
    specs: Vec<EmitterSpec>,
    stagger: Duration,
}

impl FleetOrchestrator {
    pub fn new(channel: Arc<PublishChannel>, specs: Vec<EmitterSpec>) -> Self {
        Self {
            channel,
            specs,
            stagger: Duration::from_millis(200),
        }
    }

    /// 相邻两个发射器启动之间的间隔。
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// 运行直到 `cancel` 被取消；无论成功与否都恰好断开一次。
    pub async fn run(self, cancel: CancellationToken) -> Result<FleetReport, FleetError> {
        let FleetOrchestrator {
            channel,
            specs,
            stagger,
        } = self;

        match channel.connect(&cancel).await {
            Ok(_) => {}
            Err(err) if err.is_cancelled() => {
                info!(target: "ems.fleet", "fleet_cancelled_before_connect");
                channel.disconnect().await;
                return Ok(FleetReport::default());
            }
            Err(err) => {
                error!(target: "ems.fleet", error = %err, "fleet_connect_failed");
                channel.disconnect().await;
                return Err(FleetError::Connect(err));
            }
        }

        let handles = spawn_staggered(&channel, specs, stagger, &cancel).await;
        info!(target: "ems.fleet", emitters = handles.len(), "fleet_started");

        cancel.cancelled().await;
        info!(target: "ems.fleet", emitters = handles.len(), "fleet_stopping");

        let mut report = FleetReport {
            emitters: handles.len(),
            ..FleetReport::default()
        };
        for handle in handles {
            match handle.await {
                Ok(stats) => report.absorb(stats),
                Err(err) => {
                    report.aborted += 1;
                    warn!(target: "ems.fleet", error = %err, "emitter_task_aborted");
                }
            }
        }

        channel.disconnect().await;
        let snapshot = metrics().snapshot();
        info!(
            target: "ems.fleet",
            emitters = report.emitters,
            ticks = report.ticks,
            published = report.published,
            failed = report.failed,
            readings_generated = snapshot.readings_generated,
            publish_success = snapshot.publish_success,
            publish_failure = snapshot.publish_failure,
            publish_retries = snapshot.publish_retries,
            tick_failures = snapshot.tick_failures,
            "fleet_stopped"
        );
        Ok(report)
    }
}

async fn spawn_staggered(
    channel: &Arc<PublishChannel>,
    specs: Vec<EmitterSpec>,
    stagger: Duration,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<EmitterStats>> {
    let mut handles = Vec::with_capacity(specs.len());
    for (index, spec) in specs.into_iter().enumerate() {
        if index > 0 && !stagger.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(stagger) => {}
            }
        }
        if cancel.is_cancelled() {
            break;
        }
        let emitter = Emitter::new(spec, channel.clone());
        handles.push(tokio::spawn(emitter.run(cancel.clone())));
    }
    handles
}

//! 单个监测点的发射循环。

use crate::generator::MonitoringPoint;
use chrono::Utc;
use ems_publish::PublishChannel;
use ems_telemetry::{record_reading_generated, record_tick_failure};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 发射周期。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Fixed(Duration),
    /// 每次在 `[min, max)` 内重新抽取。
    Random { min: Duration, max: Duration },
}

impl Interval {
    pub fn fixed_secs(secs: u64) -> Self {
        Interval::Fixed(Duration::from_secs(secs))
    }

    pub fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            Interval::Fixed(interval) => interval,
            Interval::Random { min, max } if max > min => rng.gen_range(min..max),
            Interval::Random { min, .. } => min,
        }
    }

    /// 本周期可能取到的最大值。
    pub fn upper_bound(&self) -> Duration {
        match *self {
            Interval::Fixed(interval) => interval,
            Interval::Random { min, max } => min.max(max),
        }
    }
}

/// 发射器定义。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterSpec {
    pub point: MonitoringPoint,
    pub topic: String,
    pub interval: Interval,
}

impl EmitterSpec {
    pub fn new(point: MonitoringPoint, interval: Interval) -> Self {
        Self {
            topic: point.topic().to_string(),
            point,
            interval,
        }
    }
}

/// 单个发射器退出时的计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    pub ticks: u64,
    pub published: u64,
    pub failed: u64,
}

pub struct Emitter {
    spec: EmitterSpec,
    channel: Arc<PublishChannel>,
}

impl Emitter {
    pub fn new(spec: EmitterSpec, channel: Arc<PublishChannel>) -> Self {
        Self { spec, channel }
    }

    pub fn spec(&self) -> &EmitterSpec {
        &self.spec
    }

    /// 立即发射第一次，此后按周期发射直到取消。
    ///
    /// 截止时间由上一个截止时间推算；落后超过一个周期时跳到下一个未来的截止时间，不补发。
    pub async fn run(self, cancel: CancellationToken) -> EmitterStats {
        let mut rng = StdRng::from_entropy();
        let mut stats = EmitterStats::default();
        let mut deadline = Instant::now();
        info!(
            target: "ems.fleet",
            device_id = %self.spec.point.device_id(),
            topic = %self.spec.topic,
            "emitter_started"
        );
        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.tick(&mut rng, &cancel, &mut stats).await;
            let interval = self.spec.interval.next(&mut rng);
            deadline = next_deadline(deadline, interval, Instant::now());
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep_until(deadline) => {}
            }
        }
        info!(
            target: "ems.fleet",
            device_id = %self.spec.point.device_id(),
            ticks = stats.ticks,
            published = stats.published,
            failed = stats.failed,
            "emitter_stopped"
        );
        stats
    }

    async fn tick(&self, rng: &mut StdRng, cancel: &CancellationToken, stats: &mut EmitterStats) {
        stats.ticks += 1;
        let reading = match self.spec.point.generate(rng, Utc::now()) {
            Ok(reading) => reading,
            Err(err) => {
                stats.failed += 1;
                record_tick_failure();
                warn!(
                    target: "ems.fleet",
                    topic = %self.spec.topic,
                    error = %err,
                    "reading_generation_failed"
                );
                return;
            }
        };
        record_reading_generated();
        match self.channel.publish(&self.spec.topic, reading, cancel).await {
            Ok(receipt) => {
                stats.published += 1;
                debug!(
                    target: "ems.fleet",
                    topic = %self.spec.topic,
                    attempts = receipt.attempts,
                    "emitter_tick_published"
                );
            }
            Err(err) => {
                stats.failed += 1;
                record_tick_failure();
                warn!(
                    target: "ems.fleet",
                    topic = %self.spec.topic,
                    error = %err,
                    "emitter_tick_failed"
                );
            }
        }
    }
}

/// 下一个严格晚于 `now` 的截止时间，保持与 `previous` 的相位。
fn next_deadline(previous: Instant, interval: Duration, now: Instant) -> Instant {
    let next = previous + interval;
    if next > now || interval.is_zero() {
        return next.max(now);
    }
    let behind = now.duration_since(next).as_nanos();
    let skipped = behind / interval.as_nanos() + 1;
    let skipped = u32::try_from(skipped).unwrap_or(u32::MAX);
    next + interval.saturating_mul(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_follows_previous_deadline() {
        let base = Instant::now();
        let interval = Duration::from_secs(60);
        let now = base + Duration::from_millis(250);
        assert_eq!(next_deadline(base, interval, now), base + interval);
    }

    #[test]
    fn overrun_skips_forward_without_losing_phase() {
        let base = Instant::now();
        let interval = Duration::from_secs(30);
        let now = base + Duration::from_secs(95);
        assert_eq!(
            next_deadline(base, interval, now),
            base + Duration::from_secs(120)
        );
    }

    #[test]
    fn random_interval_stays_within_bounds() {
        let interval = Interval::Random {
            min: Duration::from_secs(10),
            max: Duration::from_secs(30),
        };
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let next = interval.next(&mut rng);
            assert!(next >= Duration::from_secs(10) && next < Duration::from_secs(30));
        }
        assert_eq!(interval.upper_bound(), Duration::from_secs(30));
    }
}

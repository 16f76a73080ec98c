//! 可复用的重试策略：最大尝试次数、尝试间延迟、可重试错误分类。
//!
//! 建连与发布共用同一套循环，只是参数不同：
//!
//! | 场景 | 最大尝试 | 延迟 |
//! |------|----------|------|
//! | connect | 5 | 1s, 2s, 4s, 8s（`2^n` 秒） |
//! | publish | 3 | 固定 1s |
//!
//! 每次失败后、进入等待前检查取消信号；等待期间同样可被取消打断。

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// 错误是否值得重试。
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// 尝试间延迟函数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// 固定延迟。
    Fixed(Duration),
    /// 第 n 次失败后等待 `base * 2^(n-1)`。
    Exponential { base: Duration },
}

/// 重试策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

/// 成功结果及其消耗的尝试次数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// 重试循环的失败结局。
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },
    #[error("non-retryable failure on attempt {attempts}: {source}")]
    Fatal {
        attempts: u32,
        #[source]
        source: E,
    },
    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl<E: std::error::Error + 'static> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::Fatal { attempts, .. }
            | RetryError::Cancelled { attempts } => *attempts,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}

impl RetryPolicy {
    /// `max_attempts` 为 0 时按 1 处理。
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// 建连策略：5 次尝试，指数退避。
    pub fn connect_default() -> Self {
        Self::new(
            5,
            Backoff::Exponential {
                base: Duration::from_secs(1),
            },
        )
    }

    /// 发布策略：3 次尝试，固定 1s。
    pub fn publish_default() -> Self {
        Self::new(3, Backoff::Fixed(Duration::from_secs(1)))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 第 `attempt` 次（从 1 计）失败后的等待时长。
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base } => {
                let exponent = attempt.saturating_sub(1).min(16);
                base.saturating_mul(1u32 << exponent)
            }
        }
    }

    /// 执行 `op` 直到成功、遇到不可重试错误、耗尽次数或被取消。
    ///
    /// `op` 收到当前尝试序号（从 1 计）。
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<Attempted<T>, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::error::Error + 'static,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match op(attempt).await {
                Ok(value) => {
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    });
                }
                Err(err) => err,
            };
            if !err.is_retryable() {
                return Err(RetryError::Fatal {
                    attempts: attempt,
                    source: err,
                });
            }
            if attempt >= self.max_attempts {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: err,
                });
            }
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled { attempts: attempt });
            }
            let delay = self.delay_after(attempt);
            warn!(
                target: "ems.publish",
                operation = %operation,
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retry_scheduled"
            );
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_doubles_from_one_second() {
        let policy = RetryPolicy::connect_default();
        let delays: Vec<u64> = (1..=4).map(|n| policy.delay_after(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8]);
        assert_eq!(policy.max_attempts(), 5);
    }

    #[test]
    fn fixed_backoff_is_constant() {
        let policy = RetryPolicy::publish_default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 3);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, Backoff::Fixed(Duration::ZERO));
        assert_eq!(policy.max_attempts(), 1);
    }
}

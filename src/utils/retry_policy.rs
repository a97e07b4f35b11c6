// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// 重试策略配置
///
/// 存储层使用固定退避：每次失败后等待相同的时长
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数（不含首次尝试）
    pub max_retries: u32,
    /// 固定退避时间
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// 创建固定退避的重试策略
    pub fn fixed(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// 计算下次重试的退避时间
    pub fn calculate_backoff(&self, _attempt: u32) -> Duration {
        self.backoff
    }

    /// 是否应该重试
    ///
    /// `attempt` 为已经失败的重试次数
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// 执行操作，遇到可重试错误时按策略重试
    ///
    /// # 参数
    ///
    /// * `label` - 日志中使用的操作名称
    /// * `is_retryable` - 判断错误是否可重试
    /// * `operation` - 每次调用生成一次新的尝试
    ///
    /// # 返回值
    ///
    /// 最后一次尝试的结果
    pub async fn run<T, E, F, Fut, P>(
        &self,
        label: &str,
        is_retryable: P,
        mut operation: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) && self.should_retry(attempt) => {
                    attempt += 1;
                    warn!(
                        operation = label,
                        attempt,
                        max_retries = self.max_retries,
                        "Transient failure, retrying: {}",
                        e
                    );
                    tokio::time::sleep(self.calculate_backoff(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_fixed_backoff_is_constant() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(250));

        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(250));
        assert_eq!(policy.calculate_backoff(3), Duration::from_millis(250));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::default();

        assert!(policy.should_retry(0));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3)); // max_retries = 3
    }

    #[tokio::test]
    async fn test_run_retries_until_success() {
        let policy = RetryPolicy::fixed(3, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = policy
            .run(
                "flaky",
                |_| true,
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err("busy".to_string())
                    } else {
                        Ok(n)
                    }
                },
            )
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_gives_up_after_budget() {
        let policy = RetryPolicy::fixed(2, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .run(
                "always-fails",
                |_| true,
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("down".to_string())
                },
            )
            .await;

        assert!(result.is_err());
        // first attempt + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_does_not_retry_permanent_errors() {
        let policy = RetryPolicy::fixed(5, Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .run(
                "conflict",
                |e: &String| e != "duplicate",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("duplicate".to_string())
                },
            )
            .await;

        assert_eq!(result, Err("duplicate".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

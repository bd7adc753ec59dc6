//! 后台任务轮询
//!
//! 按固定间隔查询任务状态，直到：
//! - Completed：返回该快照
//! - Failed：立即以快照中的 message / error 报错
//! - 超过等待时长：超时错误
//! - 调用方取消：取消错误
//!
//! 不做退避、不加抖动、不重试，单次查询失败直接结束等待。

use crate::api::types::{TaskState, TaskStatus};
use crate::config::ApiConfig;
use crate::error::{Result, SdkError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 任务快照来源
#[async_trait]
pub trait TaskFetcher: Send + Sync {
    /// 查询一次任务状态
    async fn fetch_task(&self, id: &str) -> Result<TaskState>;
}

/// 等待参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// 轮询间隔（默认 1 秒）
    pub interval: Duration,
    /// 最长等待时间（默认 60 秒）
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            timeout: Duration::from_millis(60_000),
        }
    }
}

impl WaitOptions {
    /// 使用配置中的轮询默认值
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_millis(config.poll_timeout_ms),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// 轮询直到任务结束
///
/// `cancel` 被触发时，无论正在查询还是正在等待间隔，都会立即返回 `SdkError::Cancelled`
pub async fn wait_for_task<F>(
    fetcher: &F,
    id: &str,
    options: WaitOptions,
    cancel: Option<&CancellationToken>,
) -> Result<TaskState>
where
    F: TaskFetcher + ?Sized,
{
    let never = CancellationToken::new();
    let cancel = cancel.unwrap_or(&never);
    let cancelled = || SdkError::Cancelled { id: id.to_string() };

    let start = Instant::now();
    let mut polls = 0u32;

    info!(
        "开始等待任务: id={}, interval={:?}, timeout={:?}",
        id, options.interval, options.timeout
    );

    loop {
        if start.elapsed() >= options.timeout {
            warn!("等待任务超时: id={}, polls={}", id, polls);
            return Err(SdkError::Timeout {
                id: id.to_string(),
                timeout_ms: options.timeout.as_millis() as u64,
            });
        }

        let state = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            state = fetcher.fetch_task(id) => state?,
        };
        polls += 1;

        debug!(
            "任务状态: id={}, status={}, progress={:.1}%, poll={}",
            id, state.status, state.progress, polls
        );

        match state.status {
            TaskStatus::Completed => {
                info!("任务完成: id={}, polls={}", id, polls);
                return Ok(state);
            }
            TaskStatus::Failed => {
                let message = state.failure_reason();
                warn!("任务失败: id={}, reason={}", id, message);
                return Err(SdkError::TaskFailed {
                    id: id.to_string(),
                    message,
                });
            }
            TaskStatus::Pending | TaskStatus::Processing => {}
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            _ = tokio::time::sleep(options.interval) => {}
        }
    }
}

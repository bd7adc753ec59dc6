//! SDK 错误类型
//!
//! 主 API 的请求分发器和存储客户端共用同一套错误构造逻辑：
//! - JSON 响应：优先取 `message`，其次 `statusMessage`，最后回退到 `API Error: <status>`
//! - 文本响应：拼接状态码、状态文本和响应体

use reqwest::StatusCode;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// SDK 统一结果类型
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK 错误
#[derive(Debug, Error)]
pub enum SdkError {
    /// 配置缺失或无效（构造时立即失败）
    #[error("配置错误: {0}")]
    Config(String),

    /// 远端返回非成功状态码
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 传输层错误
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// 响应体无法按预期解析
    #[error("解析响应失败: {0}")]
    Decode(String),

    /// 不支持的文件源类型
    #[error("Invalid source type: {0}")]
    InvalidSource(String),

    /// 本地文件读取失败
    #[error("读取本地文件失败: {path:?}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 远端任务进入 Failed 状态
    #[error("{message}")]
    TaskFailed { id: String, message: String },

    /// 轮询超时
    #[error("Task {id} timed out after {timeout_ms}ms")]
    Timeout { id: String, timeout_ms: u64 },

    /// 调用方取消了等待
    #[error("Task {id} wait cancelled")]
    Cancelled { id: String },

    /// 响应类型与调用方期望不符（期望二进制却收到 JSON，反之亦然）
    #[error("意外的响应类型: {0}")]
    UnexpectedResponse(String),
}

impl SdkError {
    /// 非成功响应对应的 HTTP 状态码
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            SdkError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// 是否为超时错误
    pub fn is_timeout(&self) -> bool {
        matches!(self, SdkError::Timeout { .. })
    }
}

/// 非成功响应的错误构造器
pub struct ApiError;

impl ApiError {
    /// 从 JSON 响应体构造错误
    ///
    /// `body` 为 `None` 表示响应体不是合法 JSON
    pub fn from_json(status: StatusCode, body: Option<&Value>) -> SdkError {
        let message = body
            .and_then(|v| {
                Self::non_empty_str(&v["message"]).or_else(|| Self::non_empty_str(&v["statusMessage"]))
            })
            .map(str::to_string)
            .unwrap_or_else(|| format!("API Error: {}", status.as_u16()));

        SdkError::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// 从文本响应体构造错误（状态码 + 状态文本 + 响应体）
    pub fn from_text(context: &str, status: StatusCode, body: &str) -> SdkError {
        let reason = status.canonical_reason().unwrap_or("Unknown");
        let body = body.trim();
        let message = if body.is_empty() {
            format!("{} failed: {} {}", context, status.as_u16(), reason)
        } else {
            format!("{} failed: {} {} - {}", context, status.as_u16(), reason, body)
        };

        SdkError::Api {
            status: status.as_u16(),
            message,
        }
    }

    fn non_empty_str(value: &Value) -> Option<&str> {
        value.as_str().filter(|s| !s.is_empty())
    }
}

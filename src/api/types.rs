// 主 API 数据类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =====================================================
// 任务
// =====================================================

/// 后台任务状态
///
/// 状态由服务端维护，客户端只观察
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[serde(alias = "Pending", alias = "PENDING")]
    Pending,
    #[serde(alias = "Processing", alias = "PROCESSING")]
    Processing,
    #[serde(alias = "Completed", alias = "COMPLETED")]
    Completed,
    #[serde(alias = "Failed", alias = "FAILED")]
    Failed,
}

impl TaskStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务状态快照
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    /// 任务 ID，部分响应不回传
    #[serde(default)]
    pub id: String,
    pub status: TaskStatus,
    /// 进度百分比 (0-100)
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskState {
    /// 失败原因：message 优先，其次 error，最后回退到 "Task failed"
    pub fn failure_reason(&self) -> String {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("Task failed")
            .to_string()
    }
}

// =====================================================
// 请求参数
// =====================================================

/// YouTube 下载参数
#[derive(Debug, Clone, Default)]
pub struct YoutubeOptions {
    /// 输出格式（默认 mp4）
    pub format: Option<String>,
    /// 画质，如 720p
    pub quality: Option<String>,
}

/// DNS 记录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsRecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Txt,
    Soa,
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Txt => "TXT",
            Self::Soa => "SOA",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for DnsRecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::Aaaa),
            "CNAME" => Ok(Self::Cname),
            "MX" => Ok(Self::Mx),
            "NS" => Ok(Self::Ns),
            "TXT" => Ok(Self::Txt),
            "SOA" => Ok(Self::Soa),
            other => Err(format!("未知的 DNS 记录类型: {}", other)),
        }
    }
}

/// 二维码参数
#[derive(Debug, Clone, Default)]
pub struct QrOptions {
    /// 边长（像素）
    pub size: Option<u32>,
    /// 图片格式（默认 png）
    pub format: Option<String>,
}

/// 条形码参数
#[derive(Debug, Clone, Default)]
pub struct BarcodeOptions {
    /// 码制（默认 code128）
    pub symbology: Option<String>,
    /// 图片格式
    pub format: Option<String>,
}

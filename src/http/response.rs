// 响应解析

use crate::error::{ApiError, Result, SdkError};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 主 API 的 JSON 响应信封
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// 取出 data，缺失时报解析错误
    pub fn into_data(self) -> Result<T> {
        self.data
            .ok_or_else(|| SdkError::Decode("响应缺少 data 字段".to_string()))
    }
}

/// 二进制响应（图片或 PDF）
///
/// 二进制响应不做状态码检查，调用方可通过 `status` 自行判断
#[derive(Debug, Clone)]
pub struct BinaryPayload {
    pub status: u16,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl BinaryPayload {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type.starts_with("application/pdf")
    }

    /// 按内容类型推断文件扩展名
    pub fn extension(&self) -> &'static str {
        let mime = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        match mime {
            "application/pdf" => "pdf",
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/svg+xml" => "svg",
            _ => "bin",
        }
    }
}

/// 分发器的返回值
#[derive(Debug, Clone)]
pub enum ApiResponse {
    Json(Value),
    Binary(BinaryPayload),
}

impl ApiResponse {
    pub fn into_json(self) -> Result<Value> {
        match self {
            ApiResponse::Json(v) => Ok(v),
            ApiResponse::Binary(b) => Err(SdkError::UnexpectedResponse(format!(
                "期望 JSON，收到 {} ({} 字节)",
                b.content_type,
                b.bytes.len()
            ))),
        }
    }

    pub fn into_binary(self) -> Result<BinaryPayload> {
        match self {
            ApiResponse::Binary(b) => Ok(b),
            ApiResponse::Json(v) => Err(SdkError::UnexpectedResponse(format!(
                "期望二进制内容，收到 JSON: {}",
                v
            ))),
        }
    }

    /// 将 JSON 响应反序列化为目标类型
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.into_json()?;
        serde_json::from_value(value).map_err(|e| SdkError::Decode(e.to_string()))
    }

    /// 将 JSON 响应解析为信封
    pub fn into_envelope<T: DeserializeOwned>(self) -> Result<ApiEnvelope<T>> {
        self.into_typed()
    }
}

/// 是否为二进制内容类型（图片或 PDF）
pub fn is_binary_content_type(content_type: &str) -> bool {
    let ct = content_type.trim().to_ascii_lowercase();
    ct.starts_with("image/") || ct.starts_with("application/pdf")
}

/// 按内容类型解析响应
///
/// - 图片/PDF：原样返回，不检查状态码
/// - 其他：按 JSON 解析，非成功状态码转换为错误
pub fn interpret(status: StatusCode, content_type: &str, body: Vec<u8>) -> Result<ApiResponse> {
    if is_binary_content_type(content_type) {
        return Ok(ApiResponse::Binary(BinaryPayload {
            status: status.as_u16(),
            content_type: content_type.to_string(),
            bytes: body,
        }));
    }

    let parsed = serde_json::from_slice::<Value>(&body);

    if !status.is_success() {
        return Err(ApiError::from_json(status, parsed.as_ref().ok()));
    }

    parsed
        .map(ApiResponse::Json)
        .map_err(|e| SdkError::Decode(format!("响应不是合法 JSON: {}", e)))
}

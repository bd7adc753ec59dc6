//! 文件源解析
//!
//! 上传类接口接受多种输入（URL、本地路径、内存字节、Blob），在调用时统一解析为可上传的内容：
//! - 图片接口：`http://`/`https://` 开头的字符串原样交给服务端拉取，其他字符串按本地路径读取
//! - 存储接口：字符串一律按本地路径读取

use crate::error::{Result, SdkError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::multipart;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_MIME: &str = "application/octet-stream";

/// 带元数据的二进制块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub mime: Option<String>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            file_name: None,
            mime: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// 文件源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// 字符串位置（URL 或本地路径，由具体接口决定如何解释）
    Location(String),
    /// 内存字节
    Buffer(Vec<u8>),
    /// 二进制块
    Blob(Blob),
}

impl From<&str> for FileSource {
    fn from(s: &str) -> Self {
        FileSource::Location(s.to_string())
    }
}

impl From<String> for FileSource {
    fn from(s: String) -> Self {
        FileSource::Location(s)
    }
}

impl From<&Path> for FileSource {
    fn from(p: &Path) -> Self {
        FileSource::Location(p.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for FileSource {
    fn from(p: PathBuf) -> Self {
        FileSource::from(p.as_path())
    }
}

impl From<Vec<u8>> for FileSource {
    fn from(bytes: Vec<u8>) -> Self {
        FileSource::Buffer(bytes)
    }
}

impl From<&[u8]> for FileSource {
    fn from(bytes: &[u8]) -> Self {
        FileSource::Buffer(bytes.to_vec())
    }
}

impl From<Blob> for FileSource {
    fn from(blob: Blob) -> Self {
        FileSource::Blob(blob)
    }
}

/// 从动态 JSON 值构造文件源
///
/// - 字符串 → Location
/// - 0..=255 的整数数组 → Buffer
/// - `{ "base64": "...", "name"?: "...", "mime"?: "..." }` → Blob
///
/// 其余形状均为不支持的类型
impl TryFrom<Value> for FileSource {
    type Error = SdkError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(FileSource::Location(s)),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(FileSource::Buffer)
                .ok_or_else(|| SdkError::InvalidSource("array of non-byte values".to_string())),
            Value::Object(map) => {
                let encoded = map
                    .get("base64")
                    .and_then(Value::as_str)
                    .ok_or_else(|| SdkError::InvalidSource("object".to_string()))?;
                let data = BASE64
                    .decode(encoded)
                    .map_err(|e| SdkError::InvalidSource(format!("invalid base64 blob: {}", e)))?;
                Ok(FileSource::Blob(Blob {
                    data,
                    file_name: map.get("name").and_then(Value::as_str).map(str::to_string),
                    mime: map.get("mime").and_then(Value::as_str).map(str::to_string),
                }))
            }
            Value::Null => Err(SdkError::InvalidSource("null".to_string())),
            Value::Bool(_) => Err(SdkError::InvalidSource("boolean".to_string())),
            Value::Number(_) => Err(SdkError::InvalidSource("number".to_string())),
        }
    }
}

/// 解析后的待上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

impl UploadFile {
    /// 转为 multipart 文件字段
    pub fn into_part(self) -> Result<multipart::Part> {
        multipart::Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .map_err(SdkError::from)
    }

    /// 替换文件名
    pub fn renamed(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    fn from_bytes(bytes: Vec<u8>, default_name: &str) -> Self {
        Self {
            bytes,
            file_name: default_name.to_string(),
            mime: DEFAULT_MIME.to_string(),
        }
    }

    fn from_blob(blob: Blob, default_name: &str) -> Self {
        let file_name = blob.file_name.unwrap_or_else(|| default_name.to_string());
        let mime = blob
            .mime
            .unwrap_or_else(|| guess_mime(&file_name).to_string());
        Self {
            bytes: blob.data,
            file_name,
            mime,
        }
    }
}

/// 图片接口的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// 远程 URL，由服务端拉取
    Url(String),
    /// 本地内容
    File(UploadFile),
}

impl ImagePayload {
    /// 以指定字段名加入表单
    pub fn attach(self, form: multipart::Form, field: &str) -> Result<multipart::Form> {
        Ok(match self {
            ImagePayload::Url(url) => form.text(field.to_string(), url),
            ImagePayload::File(file) => form.part(field.to_string(), file.into_part()?),
        })
    }
}

/// 是否为 http(s) URL（前缀不区分大小写，不忽略前导空白）
pub fn is_remote_url(s: &str) -> bool {
    let has_prefix = |prefix: &str| {
        s.get(..prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
    };
    has_prefix("http://") || has_prefix("https://")
}

/// 解析图片源：URL 原样透传，其他字符串按本地路径读取
pub async fn resolve_image_source(source: FileSource) -> Result<ImagePayload> {
    match source {
        FileSource::Location(s) if is_remote_url(&s) => {
            debug!("图片源为远程 URL，交由服务端拉取: {}", s);
            Ok(ImagePayload::Url(s))
        }
        other => resolve_with_default(other, "image").await.map(ImagePayload::File),
    }
}

/// 解析存储上传源：字符串一律按本地路径读取
pub async fn resolve_file(source: FileSource) -> Result<UploadFile> {
    resolve_with_default(source, "file").await
}

async fn resolve_with_default(source: FileSource, default_name: &str) -> Result<UploadFile> {
    match source {
        FileSource::Location(path) => read_local(Path::new(&path)).await,
        FileSource::Buffer(bytes) => Ok(UploadFile::from_bytes(bytes, default_name)),
        FileSource::Blob(blob) => Ok(UploadFile::from_blob(blob, default_name)),
    }
}

/// 读取本地文件
async fn read_local(path: &Path) -> Result<UploadFile> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| SdkError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();

    debug!("读取本地文件: {:?}, size={}", path, bytes.len());

    Ok(UploadFile {
        mime: guess_mime(&file_name).to_string(),
        bytes,
        file_name,
    })
}

/// 按扩展名推断 MIME 类型
fn guess_mime(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mpeg",
        _ => DEFAULT_MIME,
    }
}

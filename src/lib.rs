// MediaHub Rust SDK
// 媒体下载、实用工具、图片处理、后台任务和存储容器的 HTTP 客户端库

// 主 API 资源模块
pub mod api;

// 配置管理模块
pub mod config;

// 错误类型
pub mod error;

// 请求分发模块
pub mod http;

// 日志模块
pub mod logging;

// 文件源解析
pub mod source;

// 存储容器模块
pub mod storage;

// 时间戳宽松解析
pub mod timestamp;

// 导出常用类型
pub use api::{
    wait_for_task, BarcodeOptions, DnsRecordType, QrOptions, TaskFetcher, TaskState, TaskStatus,
    WaitOptions, YoutubeOptions,
};
pub use config::{ApiConfig, LogConfig, SdkConfig, StorageConfig};
pub use error::{ApiError, Result, SdkError};
pub use http::{ApiClient, ApiEnvelope, ApiResponse, BinaryPayload, QueryParams, RequestOptions};
pub use source::{Blob, FileSource};
pub use storage::{StorageClient, StorageItem};

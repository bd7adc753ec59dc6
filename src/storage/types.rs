// 存储容器数据类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 存储条目（文件或目录）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageItem {
    /// 名称
    pub name: String,
    /// 大小（字节），目录为 0
    #[serde(default)]
    pub size: u64,
    /// 是否为目录
    #[serde(default, alias = "isDir", alias = "is_directory")]
    pub is_directory: bool,
    /// 内容校验和
    #[serde(default)]
    pub checksum: Option<String>,
    /// 创建时间
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
    /// 修改时间
    #[serde(
        default,
        alias = "updatedAt",
        deserialize_with = "crate::timestamp::deserialize_opt"
    )]
    pub modified_at: Option<DateTime<Utc>>,
}

impl StorageItem {
    pub fn is_file(&self) -> bool {
        !self.is_directory
    }
}

/// 列表响应可能的形状：裸数组、`{items}` 或 `{data}`
pub(crate) fn parse_listing(value: Value) -> Result<Vec<StorageItem>, serde_json::Error> {
    let items = match value {
        Value::Object(mut map) => map
            .remove("items")
            .or_else(|| map.remove("data"))
            .unwrap_or(Value::Array(Vec::new())),
        other => other,
    };
    serde_json::from_value(items)
}

#[derive(Debug, Serialize)]
pub(crate) struct PathBody<'a> {
    pub path: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FileBody<'a> {
    pub path: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameBody<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

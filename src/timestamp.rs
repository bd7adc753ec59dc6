//! 时间戳宽松解析
//!
//! 服务端返回的时间字段格式不统一，可能是：
//! - RFC 3339 字符串（`2024-05-01T10:00:00Z`）
//! - `YYYY-MM-DD HH:MM:SS`（按 UTC 处理）
//! - Unix 秒或毫秒（数字或数字字符串，绝对值 >= 1e11 视为毫秒）
//!
//! 无法识别的值解析为 `None`，不让单个字段拖垮整个响应。

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 秒与毫秒的分界（约公元 5138 年的秒数 / 1973 年的毫秒数）
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// `#[serde(deserialize_with)]` 入口，配合 `#[serde(default)]` 使用
pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(from_value))
}

/// 从任意 JSON 值解析时间
pub fn from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(from_epoch),
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(n) = s.parse::<i64>() {
        return from_epoch(n);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    if n.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_accepted_formats() {
        for value in [
            json!("2024-05-01T10:00:00Z"),
            json!("2024-05-01T18:00:00+08:00"),
            json!("2024-05-01 10:00:00"),
            json!(1714557600),
            json!(1714557600000i64),
            json!("1714557600000"),
        ] {
            assert_eq!(from_value(&value), Some(expected()), "value: {}", value);
        }
    }

    #[test]
    fn test_unrecognized_values_are_none() {
        for value in [json!(null), json!("yesterday"), json!(true), json!({ "t": 1 })] {
            assert_eq!(from_value(&value), None, "value: {}", value);
        }
    }
}

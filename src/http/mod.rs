// 请求分发模块

pub mod client;
pub mod query;
pub mod response;

pub use client::{ApiClient, RequestBody, RequestOptions, API_KEY_HEADER};
pub use query::QueryParams;
pub use response::{ApiEnvelope, ApiResponse, BinaryPayload};

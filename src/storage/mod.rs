// 存储容器模块

pub mod client;
pub mod types;

pub use client::{StorageClient, STORAGE_TOKEN_HEADER};
pub use types::StorageItem;

// 主 API 资源模块

pub mod account;
pub mod download;
pub mod image;
pub mod task;
pub mod task_poller;
pub mod tools;
pub mod types;

pub use account::AccountApi;
pub use download::DownloadApi;
pub use image::ImageApi;
pub use task::TaskApi;
pub use task_poller::{wait_for_task, TaskFetcher, WaitOptions};
pub use tools::ToolsApi;
pub use types::*;

use crate::http::ApiClient;

impl ApiClient {
    /// 媒体下载
    pub fn download(&self) -> DownloadApi<'_> {
        DownloadApi::new(self)
    }

    /// 实用工具
    pub fn tools(&self) -> ToolsApi<'_> {
        ToolsApi::new(self)
    }

    /// 账户信息
    pub fn account(&self) -> AccountApi<'_> {
        AccountApi::new(self)
    }

    /// 图片处理
    pub fn image(&self) -> ImageApi<'_> {
        ImageApi::new(self)
    }

    /// 后台任务
    pub fn task(&self) -> TaskApi<'_> {
        TaskApi::new(self)
    }
}

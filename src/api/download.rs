// 媒体下载接口

use crate::api::types::YoutubeOptions;
use crate::error::Result;
use crate::http::{ApiClient, ApiEnvelope, QueryParams};
use serde_json::Value;
use tracing::info;

/// YouTube 默认输出格式
const DEFAULT_YOUTUBE_FORMAT: &str = "mp4";

/// 媒体下载接口
#[derive(Debug, Clone, Copy)]
pub struct DownloadApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DownloadApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// 搜索 YouTube 视频
    pub async fn youtube_search(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<ApiEnvelope<Value>> {
        self.client
            .get_json(
                "/download/youtube/search",
                QueryParams::new().push("q", query).push_opt("limit", limit),
            )
            .await
    }

    /// 获取 YouTube 视频信息
    pub async fn youtube_info(&self, url: &str) -> Result<ApiEnvelope<Value>> {
        self.client
            .get_json("/download/youtube/info", QueryParams::new().push("url", url))
            .await
    }

    /// 下载 YouTube 视频
    ///
    /// 服务端通常返回一个后台任务，可用 `TaskApi::wait_for` 等待结果
    pub async fn youtube(&self, url: &str, options: YoutubeOptions) -> Result<ApiEnvelope<Value>> {
        let format = options
            .format
            .unwrap_or_else(|| DEFAULT_YOUTUBE_FORMAT.to_string());
        info!("提交 YouTube 下载: url={}, format={}", url, format);

        self.client
            .get_json(
                "/download/youtube",
                QueryParams::new()
                    .push("url", url)
                    .push("format", format)
                    .push_opt("quality", options.quality),
            )
            .await
    }

    /// 下载 TikTok 视频
    pub async fn tiktok(&self, url: &str) -> Result<ApiEnvelope<Value>> {
        info!("提交 TikTok 下载: url={}", url);
        self.client
            .get_json("/download/tiktok", QueryParams::new().push("url", url))
            .await
    }

    /// 通用平台下载（按链接自动识别平台）
    pub async fn platform(&self, url: &str) -> Result<ApiEnvelope<Value>> {
        info!("提交通用平台下载: url={}", url);
        self.client
            .get_json("/download/aio", QueryParams::new().push("url", url))
            .await
    }
}

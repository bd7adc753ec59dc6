// 图片处理接口

use crate::error::{Result, SdkError};
use crate::http::{ApiClient, ApiResponse, BinaryPayload};
use crate::source::{resolve_image_source, FileSource};
use reqwest::multipart::Form;
use tracing::debug;

const DEFAULT_IMAGE_FORMAT: &str = "png";

/// 图片处理接口
///
/// 所有方法以 multipart 表单提交，`image` 字段为 URL 文本或文件内容。
/// 服务端处理成功时一般直接返回图片，出错时返回 JSON。
#[derive(Debug, Clone, Copy)]
pub struct ImageApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ImageApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// 调整尺寸，至少指定宽或高之一时按比例缩放
    pub async fn resize(
        &self,
        source: impl Into<FileSource>,
        width: Option<u32>,
        height: Option<u32>,
        format: Option<&str>,
    ) -> Result<ApiResponse> {
        let mut form = image_form(source.into()).await?;
        if let Some(w) = width {
            form = form.text("width", w.to_string());
        }
        if let Some(h) = height {
            form = form.text("height", h.to_string());
        }
        form = form.text("format", format.unwrap_or(DEFAULT_IMAGE_FORMAT).to_string());

        self.client.post_form("/image/resize", form).await
    }

    /// 压缩，quality 取值 1-100
    pub async fn compress(
        &self,
        source: impl Into<FileSource>,
        quality: Option<u8>,
    ) -> Result<ApiResponse> {
        let mut form = image_form(source.into()).await?;
        if let Some(q) = quality {
            form = form.text("quality", q.to_string());
        }
        self.client.post_form("/image/compress", form).await
    }

    /// 格式转换
    pub async fn convert(&self, source: impl Into<FileSource>, format: &str) -> Result<ApiResponse> {
        let form = image_form(source.into())
            .await?
            .text("format", format.to_string());
        self.client.post_form("/image/convert", form).await
    }

    /// 去除背景
    pub async fn remove_background(&self, source: impl Into<FileSource>) -> Result<ApiResponse> {
        let form = image_form(source.into()).await?;
        self.client.post_form("/image/remove-background", form).await
    }

    /// 多张图片合成 PDF
    pub async fn to_pdf<I, S>(&self, sources: I) -> Result<BinaryPayload>
    where
        I: IntoIterator<Item = S>,
        S: Into<FileSource>,
    {
        let mut form = Form::new();
        let mut count = 0usize;
        for source in sources {
            form = resolve_image_source(source.into())
                .await?
                .attach(form, "images")?;
            count += 1;
        }

        if count == 0 {
            return Err(SdkError::InvalidSource("empty image list".to_string()));
        }

        debug!("合成 PDF: {} 张图片", count);
        self.client.post_form("/image/to-pdf", form).await?.into_binary()
    }
}

/// 构造只含 `image` 字段的表单；源解析失败时不发出任何请求
async fn image_form(source: FileSource) -> Result<Form> {
    resolve_image_source(source).await?.attach(Form::new(), "image")
}

// 实用工具接口

use crate::api::types::{BarcodeOptions, DnsRecordType, QrOptions};
use crate::error::Result;
use crate::http::{ApiClient, ApiEnvelope, BinaryPayload, QueryParams};
use serde_json::Value;

const DEFAULT_QR_FORMAT: &str = "png";
const DEFAULT_BARCODE_SYMBOLOGY: &str = "code128";

/// 实用工具接口（网站检测、DNS、SSL、元数据、二维码、条形码）
#[derive(Debug, Clone, Copy)]
pub struct ToolsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ToolsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// 网站综合检测
    pub async fn web_check(&self, url: &str) -> Result<ApiEnvelope<Value>> {
        self.client
            .get_json("/tools/web-check", QueryParams::new().push("url", url))
            .await
    }

    /// DNS 查询，未指定记录类型时由服务端决定
    pub async fn dns(
        &self,
        domain: &str,
        record_type: Option<DnsRecordType>,
    ) -> Result<ApiEnvelope<Value>> {
        self.client
            .get_json(
                "/tools/dns",
                QueryParams::new()
                    .push("domain", domain)
                    .push_opt("type", record_type),
            )
            .await
    }

    /// SSL 证书信息
    pub async fn ssl(&self, domain: &str) -> Result<ApiEnvelope<Value>> {
        self.client
            .get_json("/tools/ssl", QueryParams::new().push("domain", domain))
            .await
    }

    /// 网页元数据（标题、描述、OpenGraph 等）
    pub async fn metadata(&self, url: &str) -> Result<ApiEnvelope<Value>> {
        self.client
            .get_json("/tools/metadata", QueryParams::new().push("url", url))
            .await
    }

    /// 生成二维码图片
    pub async fn qr_code(&self, text: &str, options: QrOptions) -> Result<BinaryPayload> {
        let format = options
            .format
            .unwrap_or_else(|| DEFAULT_QR_FORMAT.to_string());
        self.client
            .get(
                "/tools/qr",
                QueryParams::new()
                    .push("text", text)
                    .push_opt("size", options.size)
                    .push("format", format),
            )
            .await?
            .into_binary()
    }

    /// 生成条形码图片
    pub async fn barcode(&self, text: &str, options: BarcodeOptions) -> Result<BinaryPayload> {
        let symbology = options
            .symbology
            .unwrap_or_else(|| DEFAULT_BARCODE_SYMBOLOGY.to_string());
        self.client
            .get(
                "/tools/barcode",
                QueryParams::new()
                    .push("text", text)
                    .push("type", symbology)
                    .push_opt("format", options.format),
            )
            .await?
            .into_binary()
    }
}

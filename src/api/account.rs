// 账户接口

use crate::error::Result;
use crate::http::{ApiClient, ApiEnvelope, QueryParams};
use serde_json::Value;

/// 账户信息与监控统计
#[derive(Debug, Clone, Copy)]
pub struct AccountApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AccountApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// 当前 API Key 对应的账户信息（套餐、额度等）
    pub async fn info(&self) -> Result<ApiEnvelope<Value>> {
        self.client.get_json("/account/info", QueryParams::new()).await
    }

    /// 用量监控统计，`period` 例如 `day`、`week`、`month`
    pub async fn stats(&self, period: Option<&str>) -> Result<ApiEnvelope<Value>> {
        self.client
            .get_json("/account/stats", QueryParams::new().push_opt("period", period))
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ApiConfig;
    use crate::http::ApiClient;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_stats_without_period() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/account/stats"))
            .and(header("x-api-key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 200,
                "data": { "requests": 12 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ApiConfig::new(server.uri()).with_api_key("k")).unwrap();
        let stats = client.account().stats(None).await.unwrap();
        assert_eq!(stats.into_data().unwrap()["requests"], 12);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].url.query().is_none());
    }

    #[tokio::test]
    async fn test_info_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/account/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 200,
                "data": { "plan": "pro" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ApiConfig::new(server.uri())).unwrap();
        let info = client.account().info().await.unwrap();
        assert_eq!(info.status_code, Some(200));
        assert_eq!(info.into_data().unwrap()["plan"], "pro");
    }
}

// 主 API 请求分发器

use crate::config::ApiConfig;
use crate::error::{Result, SdkError};
use crate::http::query::QueryParams;
use crate::http::response::{interpret, ApiResponse};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{multipart, Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// API Key 请求头
pub const API_KEY_HEADER: &str = "x-api-key";

/// 请求体
#[derive(Debug)]
pub enum RequestBody {
    /// JSON 请求体，自动设置 Content-Type: application/json
    Json(Value),
    /// multipart 表单，由 reqwest 生成带 boundary 的 Content-Type
    Multipart(multipart::Form),
}

/// 单次请求参数
#[derive(Debug)]
pub struct RequestOptions {
    /// 请求方法（默认 GET）
    pub method: Method,
    /// 查询参数，值为 None 的项不会发送
    pub query: QueryParams,
    /// 请求体
    pub body: Option<RequestBody>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            query: QueryParams::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get(query: QueryParams) -> Self {
        Self {
            query,
            ..Default::default()
        }
    }

    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Json(body)),
            ..Default::default()
        }
    }

    pub fn post_form(form: multipart::Form) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Multipart(form)),
            ..Default::default()
        }
    }
}

/// 主 API 客户端
///
/// 构造后只读，克隆后共享同一个连接池
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP客户端
    client: Client,
    /// 去掉末尾斜杠的根地址
    base_url: String,
    /// API Key
    api_key: Option<String>,
    /// 构造时的完整配置（轮询默认值等）
    config: ApiConfig,
}

impl ApiClient {
    /// 创建客户端
    ///
    /// base_url 为空时立即失败
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.normalized_base_url();
        Url::parse(&base_url)
            .map_err(|e| SdkError::Config(format!("无效的 base_url {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        let api_key = config.api_key.clone().filter(|k| !k.is_empty());

        debug!(
            "初始化 API 客户端: base_url={}, api_key={}",
            base_url,
            if api_key.is_some() { "已设置" } else { "未设置" }
        );

        Ok(Self {
            client,
            base_url,
            api_key,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// 拼接完整 URL，跳过值为 None 的查询参数
    pub fn build_url(&self, endpoint: &str, query: &QueryParams) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let mut url = Url::parse(&raw)
            .map_err(|e| SdkError::Config(format!("无效的请求地址 {}: {}", raw, e)))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }

    /// 发送请求并按内容类型解析响应
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<ApiResponse> {
        // 1. 拼接 URL
        let url = self.build_url(endpoint, &options.query)?;
        debug!("API 请求: {} {}", options.method, url);

        // 2. 公共请求头
        let mut builder = self
            .client
            .request(options.method.clone(), url)
            .header(ACCEPT, "application/json");

        // 未配置 API Key 时不发送该请求头
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        // 3. 请求体
        builder = match options.body {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Multipart(form)) => builder.multipart(form),
            None => builder,
        };

        // 4. 发送请求并读取完整响应体
        let response = builder.send().await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?.to_vec();

        debug!(
            "API 响应: {} {}, status={}, content_type={}, size={}",
            options.method,
            endpoint,
            status,
            content_type,
            body.len()
        );

        // 5. 按内容类型解析（图片/PDF 原样返回，其余按 JSON）
        interpret(status, &content_type, body).map_err(|e| {
            warn!("API 请求失败: {} {}: {}", options.method, endpoint, e);
            e
        })
    }

    /// GET 请求
    pub async fn get(&self, endpoint: &str, query: QueryParams) -> Result<ApiResponse> {
        self.request(endpoint, RequestOptions::get(query)).await
    }

    /// GET 请求并反序列化 JSON 响应
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: QueryParams,
    ) -> Result<T> {
        self.get(endpoint, query).await?.into_typed()
    }

    /// POST JSON 请求并反序列化 JSON 响应
    pub async fn post_json<T: DeserializeOwned>(&self, endpoint: &str, body: Value) -> Result<T> {
        self.request(endpoint, RequestOptions::post_json(body))
            .await?
            .into_typed()
    }

    /// POST multipart 表单
    pub async fn post_form(&self, endpoint: &str, form: multipart::Form) -> Result<ApiResponse> {
        self.request(endpoint, RequestOptions::post_form(form)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> ApiClient {
        let mut config = ApiConfig::new(format!("{}/", server.uri()));
        config.api_key = api_key.map(str::to_string);
        ApiClient::new(config).unwrap()
    }

    #[test]
    fn test_new_requires_base_url() {
        let err = ApiClient::new(ApiConfig::default()).unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));

        assert!(ApiClient::new(ApiConfig::new("not a url")).is_err());
    }

    #[test]
    fn test_build_url_strips_slashes_and_skips_none() {
        let client = ApiClient::new(ApiConfig::new("https://api.example.com/v1/")).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/v1");

        let query = QueryParams::new()
            .push("q", "lo fi")
            .push_opt("limit", None::<u32>)
            .push("page", 2);
        let url = client.build_url("/download/youtube/search", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/download/youtube/search?q=lo+fi&page=2"
        );

        let url = client.build_url("account/info", &QueryParams::new()).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/account/info");
        assert!(url.query().is_none());
    }

    #[tokio::test]
    async fn test_request_sends_api_key_and_accept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/account/info"))
            .and(header("x-api-key", "secret"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "ok": true } })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let value = client.get("/account/info", QueryParams::new()).await.unwrap();
        assert_eq!(value.into_json().unwrap()["data"]["ok"], true);
    }

    #[tokio::test]
    async fn test_request_without_api_key_omits_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        client
            .get("/tools/ssl", QueryParams::new().push("domain", "example.com").push_opt("port", None::<u16>))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("x-api-key").is_none());
        let keys: Vec<String> = requests[0].url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(keys, vec!["domain".to_string()]);
    }

    #[tokio::test]
    async fn test_post_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "name": "demo" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let value: Value = client.post_json("echo", json!({ "name": "demo" })).await.unwrap();
        assert_eq!(value["id"], 7);
    }

    #[tokio::test]
    async fn test_binary_response_returned_even_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tools/qr"))
            .and(query_param("text", "hello"))
            .respond_with(
                ResponseTemplate::new(500).set_body_raw(vec![1u8, 2, 3], "image/png"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let payload = client
            .get("/tools/qr", QueryParams::new().push("text", "hello"))
            .await
            .unwrap()
            .into_binary()
            .unwrap();
        assert_eq!(payload.status, 500);
        assert_eq!(payload.bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_json_error_status_fails_with_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "statusCode": 401,
                "statusMessage": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("bad"));
        let err = client.get("/account/info", QueryParams::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
        assert_eq!(err.status(), Some(401));
    }
}

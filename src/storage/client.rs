// 存储容器客户端

use crate::config::StorageConfig;
use crate::error::{ApiError, Result, SdkError};
use crate::source::{resolve_file, FileSource};
use crate::storage::types::{parse_listing, FileBody, PathBody, RenameBody, StorageItem};
use reqwest::{multipart, Client, Method, RequestBuilder, Response, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 存储令牌请求头
pub const STORAGE_TOKEN_HEADER: &str = "x-storage-token";

/// 存储容器客户端
///
/// 独立于主 API：有自己的根地址 `<base>/storage/<containerId>` 和令牌请求头，
/// 不携带 API Key。
#[derive(Debug, Clone)]
pub struct StorageClient {
    /// HTTP客户端
    client: Client,
    /// 容器根地址
    root: String,
    /// 容器访问令牌
    token: String,
    /// 容器 ID
    container_id: String,
}

impl StorageClient {
    /// 创建客户端
    ///
    /// base_url、container_id、token 任一缺失时立即失败
    pub fn new(config: StorageConfig) -> Result<Self> {
        config.validate()?;

        let base = config.base_url.trim_end_matches('/');
        let root = format!(
            "{}/storage/{}",
            base,
            urlencoding::encode(config.container_id.trim())
        );
        Url::parse(&root)
            .map_err(|e| SdkError::Config(format!("无效的存储地址 {}: {}", root, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        debug!("初始化存储客户端: root={}", root);

        Ok(Self {
            client,
            root,
            token: config.token,
            container_id: config.container_id,
        })
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// 上传文件到远端目录
    ///
    /// `file_name` 为空时沿用源自带的文件名（本地路径的文件名、Blob 名称，或默认 "file"）
    pub async fn upload(
        &self,
        source: impl Into<FileSource>,
        remote_dir: &str,
        file_name: Option<&str>,
    ) -> Result<Value> {
        // 先解析文件源，读取失败时不发出请求
        let mut file = resolve_file(source.into()).await?;
        if let Some(name) = file_name.filter(|n| !n.is_empty()) {
            file = file.renamed(name);
        }

        info!(
            "上传文件: name={}, size={}, remote_dir={}",
            file.file_name,
            file.bytes.len(),
            remote_dir
        );

        let form = multipart::Form::new()
            .part("file", file.into_part()?)
            .text("path", remote_dir.to_string());

        let builder = self.request(Method::POST, "upload")?.multipart(form);
        let response = self.send("Storage upload", builder).await?;
        read_json(response).await
    }

    /// 删除文件或目录
    pub async fn delete(&self, path: &str) -> Result<Value> {
        let builder = self
            .request(Method::DELETE, "delete")?
            .query(&[("path", path)]);
        let response = self.send("Storage delete", builder).await?;
        read_json(response).await
    }

    /// 创建目录
    pub async fn create_folder(&self, path: &str) -> Result<Value> {
        let builder = self
            .request(Method::POST, "folder")?
            .json(&PathBody { path });
        let response = self.send("Storage create folder", builder).await?;
        read_json(response).await
    }

    /// 以文本内容创建文件
    pub async fn create_file(&self, path: &str, content: &str) -> Result<Value> {
        let builder = self
            .request(Method::POST, "file")?
            .json(&FileBody { path, content });
        let response = self.send("Storage create file", builder).await?;
        read_json(response).await
    }

    /// 重命名或移动
    pub async fn rename(&self, from: &str, to: &str) -> Result<Value> {
        let builder = self
            .request(Method::POST, "rename")?
            .json(&RenameBody { from, to });
        let response = self.send("Storage rename", builder).await?;
        read_json(response).await
    }

    /// 列出目录内容
    pub async fn list(&self, path: &str) -> Result<Vec<StorageItem>> {
        let builder = self.request(Method::GET, "list")?.query(&[("path", path)]);
        let response = self.send("Storage list", builder).await?;
        let value = read_json(response).await?;
        let items = parse_listing(value)
            .map_err(|e| SdkError::Decode(format!("存储列表格式错误: {}", e)))?;
        debug!("列出目录: path={}, count={}", path, items.len());
        Ok(items)
    }

    /// 下载文件内容
    pub async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let builder = self
            .request(Method::GET, "download")?
            .query(&[("path", path)]);
        let response = self.send("Storage download", builder).await?;
        let bytes = response.bytes().await?.to_vec();
        info!("下载文件完成: path={}, size={}", path, bytes.len());
        Ok(bytes)
    }

    fn request(&self, method: Method, op: &str) -> Result<RequestBuilder> {
        let raw = format!("{}/{}", self.root, op);
        let url = Url::parse(&raw)
            .map_err(|e| SdkError::Config(format!("无效的请求地址 {}: {}", raw, e)))?;
        Ok(self
            .client
            .request(method, url)
            .header(STORAGE_TOKEN_HEADER, &self.token))
    }

    /// 发送请求，非成功状态码转为带状态文本和响应体的错误
    async fn send(&self, context: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_text(context, status, &body);
        warn!("{}", err);
        Err(err)
    }
}

/// 读取 JSON 响应体；空响应体为 Null，非 JSON 文本原样包装为字符串
async fn read_json(response: Response) -> Result<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StorageClient {
        StorageClient::new(StorageConfig::new(server.uri(), "box-1", "secret")).unwrap()
    }

    #[test]
    fn test_missing_config_fails_construction() {
        let err = StorageClient::new(StorageConfig::new("https://s.example.com", "", "")).unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
        let message = err.to_string();
        assert!(message.contains("container_id"));
        assert!(message.contains("token"));
        assert!(!message.contains("base_url"));

        assert!(StorageClient::new(StorageConfig::new("", "box", "t")).is_err());
    }

    #[test]
    fn test_root_url() {
        let client =
            StorageClient::new(StorageConfig::new("https://s.example.com/", "box-1", "t")).unwrap();
        assert_eq!(client.root(), "https://s.example.com/storage/box-1");
        assert_eq!(client.container_id(), "box-1");
    }

    #[tokio::test]
    async fn test_list_sends_token_and_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/box-1/list"))
            .and(query_param("path", "/docs"))
            .and(header(STORAGE_TOKEN_HEADER, "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "name": "a.txt", "size": 5, "isDirectory": false },
                    { "name": "sub", "isDirectory": true }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = client_for(&server).list("/docs").await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].size, 5);
        assert!(items[1].is_directory);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("x-api-key").is_none());
    }

    #[tokio::test]
    async fn test_error_includes_status_text_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/box-1/delete"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such file"))
            .mount(&server)
            .await;

        let err = client_for(&server).delete("/gone.txt").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "Storage delete failed: 404 Not Found - no such file"
        );
    }

    #[tokio::test]
    async fn test_json_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/box-1/folder"))
            .and(body_json(json!({ "path": "/new" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/storage/box-1/file"))
            .and(body_json(json!({ "path": "/new/a.txt", "content": "hello" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/storage/box-1/rename"))
            .and(body_json(json!({ "from": "/new/a.txt", "to": "/new/b.txt" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("renamed"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.create_folder("/new").await.unwrap(), json!({ "ok": true }));
        assert_eq!(client.create_file("/new/a.txt", "hello").await.unwrap(), Value::Null);
        assert_eq!(
            client.rename("/new/a.txt", "/new/b.txt").await.unwrap(),
            json!("renamed")
        );
    }

    #[tokio::test]
    async fn test_upload_local_file_with_override_name() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("notes.txt");
        tokio::fs::write(&local, b"local-content").await.unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/box-1/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "path": "/docs/renamed.txt" })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .upload(local.as_path(), "/docs", Some("renamed.txt"))
            .await
            .unwrap();
        assert_eq!(result["path"], "/docs/renamed.txt");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body).into_owned();
        assert!(body.contains("name=\"file\"; filename=\"renamed.txt\""));
        assert!(body.contains("local-content"));
        assert!(body.contains("name=\"path\""));
        assert!(body.contains("/docs"));
    }

    #[tokio::test]
    async fn test_upload_bad_source_makes_no_request() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let err = client
            .upload("/no/such/local/file.bin", "/", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::SourceRead { .. }));

        let source = FileSource::try_from(json!(3.5));
        assert!(matches!(source, Err(SdkError::InvalidSource(_))));

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/box-1/download"))
            .and(query_param("path", "/bin/data.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8, 1, 2, 255], "application/octet-stream"))
            .mount(&server)
            .await;

        let bytes = client_for(&server).download("/bin/data.bin").await.unwrap();
        assert_eq!(bytes, vec![0, 1, 2, 255]);
    }
}

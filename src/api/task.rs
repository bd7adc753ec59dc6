// 后台任务接口

use crate::api::task_poller::{wait_for_task, TaskFetcher, WaitOptions};
use crate::api::types::TaskState;
use crate::error::Result;
use crate::http::{ApiClient, ApiEnvelope, QueryParams};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 后台任务接口
#[derive(Debug, Clone, Copy)]
pub struct TaskApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TaskApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// 查询任务当前状态
    pub async fn get(&self, id: &str) -> Result<TaskState> {
        let endpoint = format!("/task/{}", urlencoding::encode(id));
        self.client
            .get_json::<ApiEnvelope<TaskState>>(&endpoint, QueryParams::new())
            .await?
            .into_data()
    }

    /// 等待任务结束（不可取消）
    pub async fn wait_for(&self, id: &str, options: WaitOptions) -> Result<TaskState> {
        wait_for_task(self.client, id, options, None).await
    }

    /// 等待任务结束，`cancel` 触发时立即返回
    pub async fn wait_for_with_cancel(
        &self,
        id: &str,
        options: WaitOptions,
        cancel: &CancellationToken,
    ) -> Result<TaskState> {
        wait_for_task(self.client, id, options, Some(cancel)).await
    }
}

#[async_trait]
impl TaskFetcher for ApiClient {
    async fn fetch_task(&self, id: &str) -> Result<TaskState> {
        self.task().get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::TaskStatus;
    use crate::config::ApiConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task_body(status: &str) -> serde_json::Value {
        let progress = if status == "completed" { 100 } else { 10 };
        json!({
            "statusCode": 200,
            "data": {
                "id": "job 1",
                "status": status,
                "progress": progress,
                "createdAt": "2024-05-01T10:00:00Z",
                "updatedAt": "2024-05-01T10:00:05Z"
            }
        })
    }

    #[tokio::test]
    async fn test_get_encodes_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/task/job%201"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_body("processing")))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ApiConfig::new(server.uri())).unwrap();
        let state = client.task().get("job 1").await.unwrap();
        assert_eq!(state.id, "job 1");
        assert_eq!(state.status, TaskStatus::Processing);
        assert_eq!(state.progress, 10.0);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "statusCode": 404,
                "message": "Task not found"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(ApiConfig::new(server.uri())).unwrap();
        let err = client.task().get("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Task not found");
    }

    #[tokio::test]
    async fn test_wait_for_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/task/job%201"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_body("pending")))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/task/job%201"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_body("completed")))
            .mount(&server)
            .await;

        let client = ApiClient::new(ApiConfig::new(server.uri())).unwrap();
        let options = WaitOptions::default()
            .with_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(5));
        let state = client.task().wait_for("job 1", options).await.unwrap();

        assert_eq!(state.status, TaskStatus::Completed);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }
}

use serde_json::Value;
use taskflow_core::Result;
use urlencoding::encode;

use crate::client::ApiClient;

/// Read-only project and user directory.
#[derive(Debug, Clone)]
pub struct ProjectApi {
    client: ApiClient,
}

impl ProjectApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value> {
        self.client.get("/api/projects", "fetch projects").await
    }

    pub async fn get(&self, project_id: &str) -> Result<Value> {
        self.client
            .get(&format!("/api/projects/{}", encode(project_id)), "fetch project")
            .await
    }

    pub async fn users(&self) -> Result<Value> {
        self.client.get("/api/users", "fetch users").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use taskflow_core::ClientError;

    fn api(server: &MockServer) -> ProjectApi {
        ProjectApi::new(ApiClient::new(server.base_url(), Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn lists_projects_and_users() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/projects");
                then.status(200).json_body(json!([{"id": "p-1", "proj_name": "Website"}]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/users");
                then.status(200).json_body(json!([{"id": "u-1"}, {"id": "u-2"}]));
            })
            .await;

        let api = api(&server);
        assert_eq!(api.list().await.unwrap()[0]["id"], "p-1");
        assert_eq!(api.users().await.unwrap().as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/projects/p-404");
                then.status(404).json_body(json!({"error": "Project not found"}));
            })
            .await;

        let err = api(&server).get("p-404").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(ref m) if m == "Project not found"));
    }
}

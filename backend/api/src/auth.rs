use serde::Serialize;
use serde_json::Value;
use taskflow_core::{ClientError, Result, User};
use tracing::info;

use crate::client::ApiClient;

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub division_name: String,
}

/// Credential exchange. Turning the returned record into a session is the
/// caller's job (see `AuthorizationService::login`).
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self.client.post("/login", &body, "log in").await?;
        let user = user_from_response(response)?;
        info!(user_id = ?user.id, "Credentials accepted");
        Ok(user)
    }

    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let response = self.client.post("/register", registration, "register").await?;
        if response.get("ok").and_then(Value::as_bool) == Some(false) {
            let message = response
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Failed to register");
            return Err(ClientError::Application(message.to_string()));
        }
        user_from_response(response)
    }

    pub async fn health(&self) -> Result<Value> {
        self.client.get("/health", "check health").await
    }
}

/// Accepts `{"user": {...}}` as well as a bare user record.
fn user_from_response(mut response: Value) -> Result<User> {
    let record = match response.get_mut("user") {
        Some(user) if user.is_object() => user.take(),
        _ => response,
    };
    if !record.is_object() {
        return Err(ClientError::Application("Unexpected login response".into()));
    }
    serde_json::from_value(record)
        .map_err(|e| ClientError::Application(format!("Unexpected user record: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn api(server: &MockServer) -> AuthApi {
        AuthApi::new(ApiClient::new(server.base_url(), Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn login_unwraps_user_envelope() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/login")
                    .json_body(json!({"email": "ana@example.com", "password": "pw"}));
                then.status(200).json_body(json!({
                    "ok": true,
                    "user": {"id": "u-1", "email": "ana@example.com", "role_num": 4, "division_name": "IT"}
                }));
            })
            .await;

        let user = api(&server).login("ana@example.com", "pw").await.unwrap();
        mock.assert_async().await;
        assert_eq!(user.id.as_deref(), Some("u-1"));
        assert_eq!(user.role_rank(), Some(4));
    }

    #[tokio::test]
    async fn login_accepts_bare_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login");
                then.status(200).json_body(json!({"id": "u-2", "role_name": "Staff"}));
            })
            .await;

        let user = api(&server).login("b@example.com", "pw").await.unwrap();
        assert_eq!(user.role_rank(), Some(4));
    }

    #[tokio::test]
    async fn login_accepts_numeric_fields() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login");
                then.status(200)
                    .json_body(json!({"user": {"id": 42, "role_num": 4.0, "division_name": "Sales"}}));
            })
            .await;

        let user = api(&server).login("c@example.com", "pw").await.unwrap();
        assert_eq!(user.id.as_deref(), Some("42"));
        assert_eq!(user.role_rank(), Some(4));
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/login");
                then.status(401).json_body(json!({"error": "Invalid email or password"}));
            })
            .await;

        let err = api(&server).login("x@example.com", "bad").await.unwrap_err();
        assert!(matches!(err, ClientError::Authorization(ref m) if m == "Invalid email or password"));
    }

    #[tokio::test]
    async fn register_surfaces_validation_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/register");
                then.status(400).json_body(json!({"ok": false, "error": "All fields are required"}));
            })
            .await;

        let registration = Registration {
            name: "Test".into(),
            email: String::new(),
            password: "pw".into(),
            division_name: "IT".into(),
        };
        let err = api(&server).register(&registration).await.unwrap_err();
        assert_eq!(err.to_string(), "All fields are required");
    }

    #[tokio::test]
    async fn health_returns_status_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(200).json_body(json!({"status": "ok"}));
            })
            .await;

        assert_eq!(api(&server).health().await.unwrap(), json!({"status": "ok"}));
    }
}

use serde_json::Value;
use taskflow_core::{ClientError, Result};
use taskflow_routing::{DashboardMetric, RoleEndpointResolver};
use taskflow_session::{AuthorizationService, SessionStore};
use urlencoding::encode;

use crate::client::ApiClient;

#[derive(Debug, Clone)]
pub struct DashboardApi {
    client: ApiClient,
}

impl DashboardApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch one metric using the family picked for `rank`. A 403 from the
    /// backend comes back as `ClientError::Authorization`.
    pub async fn fetch(&self, metric: DashboardMetric, user_id: &str, rank: Option<i64>) -> Result<Value> {
        let endpoint = RoleEndpointResolver::new(rank).resolve(metric, user_id);
        self.client
            .get(&endpoint.path, &format!("load {metric} dashboard"))
            .await
    }

    pub async fn fetch_for_session<S: SessionStore>(
        &self,
        auth: &AuthorizationService<S>,
        metric: DashboardMetric,
    ) -> Result<Value> {
        let user_id = auth
            .current_user()
            .and_then(|u| u.id.as_deref())
            .ok_or_else(|| ClientError::Authorization("not logged in".into()))?;
        self.fetch(metric, user_id, auth.role_rank()).await
    }

    /// Raw user record as the dashboard service sees it; useful when a rank
    /// looks wrong.
    pub async fn debug_user(&self, user_id: &str) -> Result<Value> {
        self.client
            .get(&format!("/api/dashboard/debug/user/{}", encode(user_id)), "load user debug info")
            .await
    }
}

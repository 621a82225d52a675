/// Dashboard endpoint resolver: pick the staff or manager flavour of a metric
/// endpoint from the caller's role rank.
///
/// Selection only. A staff caller asking for a manager-only metric still gets
/// the manager path; the backend is the one that refuses it.
use serde::Serialize;
use taskflow_core::{STAFF_RANK, User};
use taskflow_session::{AuthorizationService, SessionStore};
use tracing::debug;
use urlencoding::encode;

use crate::metric::{DashboardMetric, EndpointFamily};

const DASHBOARD_PREFIX: &str = "/api/dashboard";

// ---------------------------------------------------------------------------
// Pure mapping
// ---------------------------------------------------------------------------

/// Staff family only for rank 4 on metrics that have a staff variant.
/// Everything else, unknown rank included, goes to the manager family.
pub fn family_for(metric: DashboardMetric, rank: Option<i64>) -> EndpointFamily {
    if rank == Some(STAFF_RANK) && metric.has_staff_variant() {
        EndpointFamily::Staff
    } else {
        EndpointFamily::Manager
    }
}

// ---------------------------------------------------------------------------
// Resolved endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoint {
    pub metric: DashboardMetric,
    pub family: EndpointFamily,
    /// Request path relative to the API base URL.
    pub path: String,
}

impl ResolvedEndpoint {
    fn build(metric: DashboardMetric, family: EndpointFamily, user_id: &str) -> Self {
        Self {
            metric,
            family,
            path: format!(
                "{DASHBOARD_PREFIX}/{}/{}/{}",
                family.as_str(),
                metric.slug(),
                encode(user_id)
            ),
        }
    }

    /// A staff-ranked caller on a manager-only metric; expect a 403.
    pub fn expects_rejection_for(&self, rank: Option<i64>) -> bool {
        rank == Some(STAFF_RANK) && !self.metric.has_staff_variant()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Endpoint resolver bound to one caller's rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleEndpointResolver {
    rank: Option<i64>,
}

impl RoleEndpointResolver {
    pub fn new(rank: Option<i64>) -> Self {
        Self { rank }
    }

    /// Rank taken from the record: `role_num`, else derived from `role_name`.
    pub fn for_user(user: &User) -> Self {
        Self::new(user.role_rank())
    }

    /// Rank of whoever is logged in; no session resolves like an unknown rank.
    pub fn for_session<S: SessionStore>(auth: &AuthorizationService<S>) -> Self {
        Self::new(auth.role_rank())
    }

    pub fn rank(&self) -> Option<i64> {
        self.rank
    }

    pub fn family(&self, metric: DashboardMetric) -> EndpointFamily {
        family_for(metric, self.rank)
    }

    pub fn resolve(&self, metric: DashboardMetric, user_id: &str) -> ResolvedEndpoint {
        let endpoint = ResolvedEndpoint::build(metric, self.family(metric), user_id);
        debug!(
            metric = %metric,
            rank = ?self.rank,
            path = %endpoint.path,
            "Resolved dashboard endpoint"
        );
        if endpoint.expects_rejection_for(self.rank) {
            debug!(metric = %metric, "Staff caller on a manager-only metric; backend will refuse");
        }
        endpoint
    }
}

/// Dashboard metrics and the endpoint families that serve them.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DashboardMetric {
    TotalTasks,
    TasksByStatus,
    TasksByPriority,
    PendingTasksByAge,
    /// Per-staff breakdown of a manager's team. Manager family only.
    TasksByStaff,
    /// Team task schedule. Manager family only.
    TasksTimeline,
}

impl DashboardMetric {
    pub const ALL: [DashboardMetric; 6] = [
        DashboardMetric::TotalTasks,
        DashboardMetric::TasksByStatus,
        DashboardMetric::TasksByPriority,
        DashboardMetric::PendingTasksByAge,
        DashboardMetric::TasksByStaff,
        DashboardMetric::TasksTimeline,
    ];

    /// Path segment used by the backend.
    pub fn slug(self) -> &'static str {
        match self {
            DashboardMetric::TotalTasks => "total-tasks",
            DashboardMetric::TasksByStatus => "tasks-by-status",
            DashboardMetric::TasksByPriority => "tasks-by-priority",
            DashboardMetric::PendingTasksByAge => "pending-tasks-by-age",
            DashboardMetric::TasksByStaff => "tasks-by-staff",
            DashboardMetric::TasksTimeline => "tasks-timeline",
        }
    }

    /// Whether the backend serves this metric to staff at all.
    pub fn has_staff_variant(self) -> bool {
        !matches!(self, DashboardMetric::TasksByStaff | DashboardMetric::TasksTimeline)
    }
}

impl fmt::Display for DashboardMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dashboard metric \"{0}\" (expected one of: total-tasks, tasks-by-status, tasks-by-priority, pending-tasks-by-age, tasks-by-staff, tasks-timeline)")]
pub struct UnknownMetric(pub String);

impl FromStr for DashboardMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DashboardMetric::ALL
            .into_iter()
            .find(|m| m.slug() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Which half of the dashboard API a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointFamily {
    Staff,
    Manager,
}

impl EndpointFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointFamily::Staff => "staff",
            EndpointFamily::Manager => "manager",
        }
    }
}

impl fmt::Display for EndpointFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod metric;
pub mod resolve_endpoint;

pub use metric::{DashboardMetric, EndpointFamily, UnknownMetric};
pub use resolve_endpoint::{family_for, ResolvedEndpoint, RoleEndpointResolver};

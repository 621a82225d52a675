use anyhow::Result;
use clap::Args;
use taskflow_core::ClientError;
use taskflow_routing::{DashboardMetric, RoleEndpointResolver};

use crate::context::AppContext;
use crate::terminal_output::{note_info, note_warn, print_json};

#[derive(Args)]
pub struct DashboardArgs {
    /// Metric to load (total-tasks, tasks-by-status, tasks-by-priority,
    /// pending-tasks-by-age, tasks-by-staff, tasks-timeline)
    pub metric: DashboardMetric,
    /// Print the endpoint that would be called and stop
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(ctx: &AppContext, args: DashboardArgs) -> Result<()> {
    let user_id = ctx.require_user_id()?;
    let resolver = RoleEndpointResolver::for_session(&ctx.auth);

    if args.dry_run {
        let endpoint = resolver.resolve(args.metric, &user_id);
        print_json(&serde_json::to_value(&endpoint)?);
        return Ok(());
    }

    match ctx.backend.dashboard.fetch_for_session(&ctx.auth, args.metric).await {
        Ok(body) => print_json(&body),
        Err(ClientError::Authorization(msg)) => {
            note_warn(&format!("{} is not available for your role: {msg}", args.metric));
            if resolver.resolve(args.metric, &user_id).expects_rejection_for(resolver.rank()) {
                note_info("Team metrics need a manager or director account");
            }
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

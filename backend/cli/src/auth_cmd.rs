//! CLI session commands: login, logout, whoami, health.

use anyhow::Result;
use serde_json::json;

use crate::context::AppContext;
use crate::terminal_output::{note_info, note_success, note_warn, print_json};

pub async fn login(ctx: &mut AppContext, email: &str, password: &str) -> Result<()> {
    let user = ctx.backend.auth.login(email, password).await?;
    let name = user.name.clone().or_else(|| user.email.clone()).unwrap_or_default();

    if let Err(e) = ctx.auth.login(user) {
        note_warn(&format!("Logged in, but the session could not be saved: {e}"));
    }
    note_success(&format!("Logged in as {name}"));

    // Same as the web client after login: look for upcoming deadlines.
    // Awaited here only because the process exits right after.
    if let Ok(Some(result)) = ctx.backend.notifications.spawn_deadline_check().await {
        if let Some(created) = result.get("notifications_created").and_then(|v| v.as_u64()) {
            if created > 0 {
                note_info(&format!("{created} new deadline notification(s)"));
            }
        }
    }
    Ok(())
}

pub fn logout(ctx: &mut AppContext) -> Result<()> {
    ctx.auth.logout()?;
    note_success("Logged out");
    Ok(())
}

pub async fn whoami(ctx: &mut AppContext, backend: bool) -> Result<()> {
    if !ctx.auth.check_auth_status() {
        note_info("Not logged in");
        return Ok(());
    }
    let user = ctx.auth.current_user();
    print_json(&json!({
        "id": user.and_then(|u| u.id.as_deref()),
        "name": user.and_then(|u| u.name.as_deref()),
        "email": user.and_then(|u| u.email.as_deref()),
        "division": ctx.auth.current_division(),
        "scope": ctx.config.session_scope,
        "sessionFile": ctx.session_file().display().to_string(),
        "roleInfo": ctx.auth.role_info(),
    }));
    if backend {
        let user_id = ctx.require_user_id()?;
        match ctx.backend.dashboard.debug_user(&user_id).await {
            Ok(record) => print_json(&record),
            Err(e) => note_warn(&format!("Dashboard service has no view of {user_id}: {e}")),
        }
    }
    Ok(())
}

pub async fn health(ctx: &AppContext) -> Result<()> {
    match ctx.backend.auth.health().await {
        Ok(body) => print_json(&body),
        Err(e) => note_warn(&format!("Backend at {} is not healthy: {e}", ctx.config.base_url())),
    }
    Ok(())
}

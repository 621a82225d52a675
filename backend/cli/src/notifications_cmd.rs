//! CLI Notifications Subcommands

use anyhow::Result;
use clap::Subcommand;
use taskflow_api::Notification;

use crate::context::AppContext;
use crate::terminal_output::{note_info, note_success, print_json, render_table, Column};

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// List your notifications
    List {
        /// Only unread ones
        #[arg(long)]
        unread: bool,
    },
    /// Print the number of unread notifications
    Count,
    /// Mark one notification as read
    Read { id: String },
    /// Mark all of your notifications as read
    ReadAll,
    /// Delete a notification
    Delete { id: String },
    /// Ask the backend to generate deadline reminders now
    CheckDeadlines,
}

pub async fn run(ctx: &AppContext, cmd: NotificationCommands) -> Result<()> {
    let api = &ctx.backend.notifications;
    match cmd {
        NotificationCommands::List { unread } => {
            let user_id = ctx.require_user_id()?;
            let notifications = api.list(&user_id, unread).await?;
            if notifications.is_empty() {
                note_info("No notifications");
            } else {
                print!("{}", notification_table(&notifications));
            }
        }
        NotificationCommands::Count => {
            let user_id = ctx.require_user_id()?;
            println!("{}", api.unread_count(&user_id).await);
        }
        NotificationCommands::Read { id } => {
            api.mark_read(&id).await?;
            note_success(&format!("Marked {id} as read"));
        }
        NotificationCommands::ReadAll => {
            let user_id = ctx.require_user_id()?;
            api.mark_all_read(&user_id).await?;
            note_success("Marked all notifications as read");
        }
        NotificationCommands::Delete { id } => {
            api.delete(&id).await?;
            note_success(&format!("Deleted notification {id}"));
        }
        NotificationCommands::CheckDeadlines => {
            print_json(&api.check_deadlines().await?);
        }
    }
    Ok(())
}

fn notification_table(notifications: &[Notification]) -> String {
    let columns = [
        Column::new("ID"),
        Column::new(""),
        Column::new("TYPE"),
        Column::truncated("TITLE", 32),
        Column::truncated("MESSAGE", 48),
        Column::new("WHEN"),
    ];
    let rows: Vec<Vec<String>> = notifications
        .iter()
        .map(|n| {
            vec![
                n.id.clone().unwrap_or_default(),
                if n.read { String::new() } else { "●".to_string() },
                n.kind.clone().unwrap_or_default(),
                n.title.clone().unwrap_or_default(),
                n.message.clone().unwrap_or_default(),
                n.timestamp.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render_table(&columns, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_rows_are_marked() {
        let read = Notification { id: Some("n-1".into()), read: true, ..Default::default() };
        let unread = Notification { id: Some("n-2".into()), ..Default::default() };
        let table = notification_table(&[read, unread]);
        let lines: Vec<&str> = table.lines().collect();
        assert!(!lines[2].contains('●'));
        assert!(lines[3].contains('●'));
    }
}

//! CLI Task Subcommands
//!
//! Listing, creation and updates, plus the trash for tasks and subtasks.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use serde_json::{json, Map, Value};
use taskflow_api::{format_file_size, plan_attachment, AttachmentOwner, ItemKind, UploadCandidate};

use crate::context::AppContext;
use crate::terminal_output::{note_info, note_success, print_json, render_table, Column};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks visible to you (or every task with --all)
    List {
        #[arg(long)]
        all: bool,
        /// Only tasks of this project
        #[arg(long)]
        project: Option<String>,
    },
    /// Show one task with its subtasks
    Show { id: String },
    /// Create a task owned by you
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Project name
        #[arg(long)]
        project: Option<String>,
        /// Start date, YYYY-MM-DD (default: today)
        #[arg(long)]
        start: Option<String>,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },
    /// Change a task's status
    Status { id: String, status: String },
    /// Move a task (or subtask) to the trash
    Delete {
        id: String,
        #[arg(long)]
        subtask: bool,
    },
    /// Bring a task (or subtask) back from the trash
    Restore {
        id: String,
        #[arg(long)]
        subtask: bool,
    },
    /// Permanently delete a trashed task (or subtask)
    Purge {
        id: String,
        #[arg(long)]
        subtask: bool,
    },
    /// List your trashed tasks (or subtasks)
    Deleted {
        #[arg(long)]
        subtask: bool,
    },
    /// Check whether a file can be attached, and where it would be stored
    AttachCheck {
        path: PathBuf,
        /// Task id; with --subtask, a subtask id
        #[arg(long)]
        to: String,
        #[arg(long)]
        subtask: bool,
    },
}

fn kind(subtask: bool) -> ItemKind {
    if subtask {
        ItemKind::Subtask
    } else {
        ItemKind::Task
    }
}

pub async fn run(ctx: &AppContext, cmd: TaskCommands) -> Result<()> {
    let tasks = &ctx.backend.tasks;
    match cmd {
        TaskCommands::List { all, project } => {
            let list = match project {
                Some(project) => tasks.list_by_project(&project).await?,
                None if all => tasks.list(None).await?,
                None => tasks.list(Some(&ctx.require_user_id()?)).await?,
            };
            print_items(&list);
        }
        TaskCommands::Show { id } => {
            let mut task = tasks.get(&id).await?;
            let subtasks = ctx.backend.subtasks.list_for_task(&id).await?;
            if let Some(obj) = task.as_object_mut() {
                obj.insert("subtasks".into(), subtasks);
            }
            print_json(&task);
        }
        TaskCommands::Create { name, description, project, start, due } => {
            let owner = ctx.require_user_id()?;
            let start = start.unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());
            let body = new_task_body(&owner, NewTask { name, description, project, start, due });
            let created = tasks.create(&body).await?;
            let id = created.get("id").and_then(Value::as_str).unwrap_or("?");
            note_success(&format!("Created task {id}"));
        }
        TaskCommands::Status { id, status } => {
            tasks.update(&id, &json!({ "task_status": status })).await?;
            note_success(&format!("Task {id} is now {status}"));
        }
        TaskCommands::Delete { id, subtask } => {
            let user_id = ctx.require_user_id()?;
            tasks.trash(kind(subtask)).soft_delete(&id, &user_id).await?;
            note_success(&format!("Moved {} {id} to the trash", kind(subtask).noun()));
        }
        TaskCommands::Restore { id, subtask } => {
            tasks.trash(kind(subtask)).restore(&id).await?;
            note_success(&format!("Restored {} {id}", kind(subtask).noun()));
        }
        TaskCommands::Purge { id, subtask } => {
            let user_id = ctx.require_user_id()?;
            tasks.trash(kind(subtask)).purge(&id, &user_id).await?;
            note_success(&format!("Permanently deleted {} {id}", kind(subtask).noun()));
        }
        TaskCommands::Deleted { subtask } => {
            let user_id = ctx.require_user_id()?;
            let items = tasks.trash(kind(subtask)).deleted(&user_id).await?;
            print_items(&Value::Array(items));
        }
        TaskCommands::AttachCheck { path, to, subtask } => {
            let user_id = ctx.require_user_id()?;
            let candidate = UploadCandidate::from_path(&path)?;
            let owner = if subtask { AttachmentOwner::Subtask(&to) } else { AttachmentOwner::Task(&to) };
            let attachment = plan_attachment(&candidate, owner, &user_id, Utc::now())?;
            note_success(&format!(
                "{} ({}) can be attached",
                attachment.name,
                format_file_size(attachment.size)
            ));
            print_json(&serde_json::to_value(&attachment)?);
        }
    }
    Ok(())
}

struct NewTask {
    name: String,
    description: Option<String>,
    project: Option<String>,
    start: String,
    due: Option<String>,
}

/// Create body in the backend's field names; `task_name` and `start_date`
/// are required there.
fn new_task_body(owner: &str, task: NewTask) -> Value {
    let mut body = Map::new();
    body.insert("task_name".into(), json!(task.name));
    body.insert("start_date".into(), json!(task.start));
    body.insert("created_by".into(), json!(owner));
    body.insert("assigned_to".into(), json!([owner]));
    body.insert("task_status".into(), json!("Unassigned"));
    if let Some(description) = task.description {
        body.insert("task_desc".into(), json!(description));
    }
    if let Some(project) = task.project {
        body.insert("proj_name".into(), json!(project));
    }
    if let Some(due) = task.due {
        body.insert("end_date".into(), json!(due));
    }
    Value::Object(body)
}

/// Task lists come back either as a bare array or wrapped in `{"tasks": [...]}`.
fn items_of(list: &Value) -> &[Value] {
    list.as_array()
        .or_else(|| list.get("tasks").and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn cell(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| item.get(*k))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

fn task_rows(items: &[Value]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|item| {
            vec![
                cell(item, &["id"]),
                cell(item, &["task_name", "name"]),
                cell(item, &["task_status", "status"]),
                cell(item, &["end_date", "due_date"]),
            ]
        })
        .collect()
}

fn print_items(list: &Value) {
    let items = items_of(list);
    if items.is_empty() {
        note_info("Nothing to show");
        return;
    }
    let columns = [
        Column::new("ID"),
        Column::truncated("NAME", 40),
        Column::new("STATUS"),
        Column::new("DUE"),
    ];
    print!("{}", render_table(&columns, &task_rows(items)));
}

//! Formatting helper functions for log output
//!
//! This module renders commands, cycle summaries and the startup banner.

use crate::commit::Command;
use crate::engine::EngineSettings;
use crate::tasks::Snapshot;

/// Describe a command for the debug log
///
/// # Arguments
/// * `command` - The command to describe
/// * `snapshot` - Snapshot the command was computed from, used to look up names
///
/// # Returns
/// One line naming the target and the change
pub fn describe_command(command: &Command, snapshot: &Snapshot) -> String {
    let task_name = |id: &str| {
        snapshot
            .find_task(id)
            .map(|t| t.content.clone())
            .unwrap_or_else(|| format!("#{}", id))
    };

    match command {
        Command::UpdateTaskLabels { id, labels } => {
            format!("labels of '{}' -> [{}]", task_name(id), labels.join(", "))
        }
        Command::UpdateTaskContent { id, content } => {
            format!("content of '{}' -> '{}'", task_name(id), content)
        }
        Command::UpdateTaskDue { id, date, .. } => {
            format!("due date of '{}' -> {}", task_name(id), date)
        }
        Command::RenameProject { id, name } => format!("project #{} -> '{}'", id, name),
        Command::RenameSection { id, name } => format!("section #{} -> '{}'", id, name),
    }
}

/// Summary line logged at the end of a cycle
pub fn format_cycle_summary(committed: usize) -> String {
    match committed {
        0 => "No changes in queue, skipping sync.".to_string(),
        1 => "1 change committed to Todoist.".to_string(),
        n => format!("{} changes committed to Todoist.", n),
    }
}

/// Startup banner listing the enabled modes
pub fn format_modes(settings: &EngineSettings) -> String {
    let mut modes = vec![format!("labelling with '{}'", settings.label)];

    if let Some(inbox) = settings.inbox {
        modes.push(format!("{} inbox", inbox));
    }
    if settings.suppression.hide_future_days > 0 {
        modes.push(format!(
            "hiding tasks due in more than {} day(s)",
            settings.suppression.hide_future_days
        ));
    }
    if let Some(shift) = settings.end_of_day {
        modes.push(format!("end of day at {}:00", shift.hour));
    }

    format!("Enabled modes: {}", modes.join(", "))
}

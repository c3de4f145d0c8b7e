//! # Task View Rendering
//!
//! Turns the latest task collection into rows with interactive controls.
//! Rendering is total replacement: every refresh throws away all previous
//! rows and rebuilds them from the server's list, in the server's order.
//!
//! Controls never talk to the network. Activating one is a pure function of
//! the row's task that yields a `Command`; the sync controller executes it.

use std::fmt;

use validator::Validate;

use crate::error::ClientError;
use crate::models::task::TaskId;
use crate::models::{NewTask, Task, TaskPatch};

pub const COMPLETE_LABEL: &str = "Complete";
pub const UNDO_LABEL: &str = "Undo";
pub const DELETE_LABEL: &str = "Delete";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// A request the dispatcher knows how to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(NewTask),
    Update { id: TaskId, patch: TaskPatch },
    Delete { id: TaskId },
}

impl Command {
    /// Checks the command's payload without sending anything.
    pub fn validate(&self) -> Result<(), ClientError> {
        match self {
            Command::Create(task) => task.validate()?,
            Command::Update { patch, .. } => patch.validate()?,
            Command::Delete { .. } => {}
        }
        Ok(())
    }

    /// Deletions need an explicit yes from the user before anything is sent.
    pub fn confirmation_prompt(&self) -> Option<&'static str> {
        match self {
            Command::Delete { .. } => Some(DELETE_PROMPT),
            _ => None,
        }
    }
}

/// The controls rendered on each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// The checkbox, changed to the carried state.
    Checkbox(bool),
    /// The "Complete"/"Undo" button; always requests the opposite state.
    CompleteButton,
    DeleteButton,
}

impl Control {
    pub fn command(self, task: &Task) -> Command {
        match self {
            Control::Checkbox(checked) => Command::Update {
                id: task.id,
                patch: TaskPatch::completed(checked),
            },
            Control::CompleteButton => Command::Update {
                id: task.id,
                patch: TaskPatch::completed(!task.completed),
            },
            Control::DeleteButton => Command::Delete { id: task.id },
        }
    }
}

/// One rendered list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    task: Task,
}

impl TaskRow {
    pub fn id(&self) -> TaskId {
        self.task.id
    }

    pub fn checked(&self) -> bool {
        self.task.completed
    }

    pub fn content(&self) -> &str {
        &self.task.content
    }

    pub fn complete_label(&self) -> &'static str {
        if self.task.completed {
            UNDO_LABEL
        } else {
            COMPLETE_LABEL
        }
    }

    pub fn delete_label(&self) -> &'static str {
        DELETE_LABEL
    }

    pub fn activate(&self, control: Control) -> Command {
        control.command(&self.task)
    }
}

impl fmt::Display for TaskRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] #{} {}  ({}) ({})",
            if self.checked() { "x" } else { " " },
            self.id(),
            self.content(),
            self.complete_label(),
            self.delete_label()
        )
    }
}

/// The rendered task list.
#[derive(Debug, Default)]
pub struct TaskView {
    rows: Vec<TaskRow>,
    renders: u64,
}

impl TaskView {
    /// Discards every row and renders `tasks` in order.
    pub fn render(&mut self, tasks: Vec<Task>) {
        self.rows = tasks.into_iter().map(|task| TaskRow { task }).collect();
        self.renders += 1;
    }

    pub fn rows(&self) -> &[TaskRow] {
        &self.rows
    }

    pub fn row(&self, id: TaskId) -> Option<&TaskRow> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// How many times the list has been rebuilt.
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}

impl fmt::Display for TaskView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "No tasks.");
        }
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

use std::fmt;

use thiserror::Error;

use crate::domain::board::{BoardId, ListId, TaskId};

pub type Result<T> = std::result::Result<T, BrelloError>;

/// Failure of a single call against the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable part, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Network(message) | Self::Decode(message) => message,
            Self::Status { message, .. } => message,
        }
    }
}

/// The user-facing action a failed request was part of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SignUp,
    ConfirmEmail,
    LogIn,
    FetchBoards,
    CreateBoard,
    UpdateBoard,
    DeleteBoard,
    ShareBoard,
    FetchTodoLists,
    CreateTodoList,
    UpdateTodoList,
    DeleteTodoList,
    CreateTask,
    UpdateTask,
    DeleteTask,
    MoveTask,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SignUp => "sign up",
            Self::ConfirmEmail => "confirm email",
            Self::LogIn => "log in",
            Self::FetchBoards => "fetch boards",
            Self::CreateBoard => "create board",
            Self::UpdateBoard => "update board",
            Self::DeleteBoard => "delete board",
            Self::ShareBoard => "share board",
            Self::FetchTodoLists => "fetch todo lists",
            Self::CreateTodoList => "create todo list",
            Self::UpdateTodoList => "update todo list",
            Self::DeleteTodoList => "delete todo list",
            Self::CreateTask => "create task",
            Self::UpdateTask => "update task",
            Self::DeleteTask => "delete task",
            Self::MoveTask => "update task position",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum BrelloError {
    #[error("Failed to {action}: {source}")]
    RequestFailed {
        action: Action,
        #[source]
        source: RemoteError,
    },

    #[error("Email not confirmed")]
    EmailNotConfirmed,

    #[error("No board selected")]
    NoBoardSelected,

    #[error("Board not found: {0}")]
    BoardNotFound(BoardId),

    #[error("Todo list not found: {0}")]
    ListNotFound(ListId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Position {index} is out of range for list {list} ({len} tasks)")]
    InvalidPosition { list: ListId, index: usize, len: usize },

    #[error("Dragged task {task} is not at position {index} of list {list}")]
    GestureMismatch { task: TaskId, list: ListId, index: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BrelloError {
    pub fn request(action: Action, source: RemoteError) -> Self {
        Self::RequestFailed { action, source }
    }

    /// The action a failed request belonged to, if this is a request failure.
    pub fn action(&self) -> Option<Action> {
        match self {
            Self::RequestFailed { action, .. } => Some(*action),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failure_names_the_action() {
        let err = BrelloError::request(
            Action::CreateTodoList,
            RemoteError::Status { status: 404, message: "Board not found".into() },
        );
        assert_eq!(err.to_string(), "Failed to create todo list: server responded 404: Board not found");
        assert_eq!(err.action(), Some(Action::CreateTodoList));
    }

    #[test]
    fn remote_error_accessors() {
        let err = RemoteError::Network("connection refused".into());
        assert_eq!(err.status(), None);
        assert_eq!(err.message(), "connection refused");

        let err = RemoteError::Status { status: 401, message: "Not authenticated".into() };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.message(), "Not authenticated");
    }
}

use async_trait::async_trait;

use super::board::{Board, BoardDraft, BoardId, ListDraft, ListId, Task, TaskDraft, TaskId, TaskUpdate, TodoList};
use crate::error::RemoteError;

/// CRUD access to boards, lists and tasks held by the remote API.
///
/// Implementations never touch caller state; every call either returns the
/// decoded resource or a [`RemoteError`].
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    async fn list_boards(&self) -> Result<Vec<Board>, RemoteError>;
    async fn create_board(&self, draft: &BoardDraft) -> Result<Board, RemoteError>;
    async fn update_board(&self, id: BoardId, draft: &BoardDraft) -> Result<Board, RemoteError>;
    async fn delete_board(&self, id: BoardId) -> Result<(), RemoteError>;
    async fn share_board(&self, id: BoardId, email: &str) -> Result<(), RemoteError>;

    async fn list_lists(&self, board: BoardId) -> Result<Vec<TodoList>, RemoteError>;
    async fn create_list(&self, board: BoardId, draft: &ListDraft) -> Result<TodoList, RemoteError>;
    async fn update_list(&self, id: ListId, draft: &ListDraft) -> Result<TodoList, RemoteError>;
    async fn delete_list(&self, id: ListId) -> Result<(), RemoteError>;
    /// Persists the full order of a list's tasks.
    async fn reorder_list(&self, id: ListId, task_ids: &[TaskId]) -> Result<(), RemoteError>;

    async fn list_tasks(&self, list: ListId) -> Result<Vec<Task>, RemoteError>;
    async fn create_task(&self, list: ListId, draft: &TaskDraft) -> Result<Task, RemoteError>;
    async fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task, RemoteError>;
    async fn delete_task(&self, id: TaskId) -> Result<(), RemoteError>;
}

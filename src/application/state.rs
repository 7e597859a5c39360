use std::collections::HashSet;

use crate::domain::board::{Board, BoardId, ListId, Task, TaskId, TodoList};
use crate::domain::column::Column;
use crate::error::{BrelloError, Result};

/// Client-side copy of the selected board's lists and tasks.
///
/// `revision` increases on every change so a pending mutation can tell whether
/// anything landed after it.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceState {
    board: Option<Board>,
    columns: Vec<Column>,
    revision: u64,
}

impl WorkspaceState {
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn board_id(&self) -> Option<BoardId> {
        self.board.as_ref().map(|b| b.id)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: ListId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id() == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// List and index currently holding `task`.
    pub fn locate(&self, task: TaskId) -> Option<(ListId, usize)> {
        self.columns
            .iter()
            .find_map(|c| c.position_of(task).map(|index| (c.id(), index)))
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.columns.iter().find_map(|c| c.get(id))
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Every way the lists/tasks fail to partition cleanly; empty when consistent.
    pub fn partition_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut lists = HashSet::new();
        let mut tasks = HashSet::new();
        for column in &self.columns {
            if !lists.insert(column.id()) {
                problems.push(format!("list {} appears twice", column.id()));
            }
            if let Some(board) = self.board_id() {
                if column.list.board_id != board {
                    problems.push(format!("list {} belongs to board {}", column.id(), column.list.board_id));
                }
            }
            for task in column.tasks() {
                if task.todo_list_id != column.id() {
                    problems.push(format!(
                        "task {} points at list {} but sits in list {}",
                        task.id,
                        task.todo_list_id,
                        column.id()
                    ));
                }
                if !tasks.insert(task.id) {
                    problems.push(format!("task {} appears twice", task.id));
                }
            }
        }
        problems
    }

    pub fn is_consistent(&self) -> bool {
        self.partition_violations().is_empty()
    }

    pub(crate) fn column_mut(&mut self, id: ListId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id() == id)
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    /// Switches to `board` with nothing loaded yet.
    pub(crate) fn select(&mut self, board: Board) {
        self.board = Some(board);
        self.columns.clear();
        self.touch();
    }

    pub(crate) fn clear(&mut self) {
        self.board = None;
        self.columns.clear();
        self.touch();
    }

    /// Refreshes the selected board's own fields; ignored for any other board.
    pub(crate) fn update_board(&mut self, board: Board) {
        if self.board_id() == Some(board.id) {
            self.board = Some(board);
            self.touch();
        }
    }

    /// Replaces all columns, as after a fetch or a rollback.
    pub(crate) fn load(&mut self, columns: Vec<Column>) {
        self.columns = columns;
        self.touch();
    }

    pub(crate) fn push_list(&mut self, list: TodoList) {
        self.columns.push(Column::new(list));
        self.touch();
    }

    pub(crate) fn replace_list(&mut self, list: TodoList) -> bool {
        match self.column_mut(list.id) {
            Some(column) => {
                column.list = list;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Drops the list together with every task it holds.
    pub(crate) fn remove_list(&mut self, id: ListId) -> Option<Column> {
        let index = self.columns.iter().position(|c| c.id() == id)?;
        let column = self.columns.remove(index);
        self.touch();
        Some(column)
    }

    pub(crate) fn push_task(&mut self, task: Task) -> Result<()> {
        let list = task.todo_list_id;
        let column = self.column_mut(list).ok_or(BrelloError::ListNotFound(list))?;
        column.push(task);
        self.touch();
        Ok(())
    }

    pub(crate) fn replace_task(&mut self, task: Task) -> bool {
        let replaced = self.columns.iter_mut().any(|c| c.replace(task.clone()));
        if replaced {
            self.touch();
        }
        replaced
    }

    pub(crate) fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        let removed = self.columns.iter_mut().find_map(|c| c.remove(id));
        if removed.is_some() {
            self.touch();
        }
        removed
    }
}

use tracing::{debug, info, instrument, warn};

use crate::application::pending::PendingMutation;
use crate::application::reorder::{self, DragGesture};
use crate::application::state::WorkspaceState;
use crate::domain::board::{Board, BoardDraft, BoardId, ListDraft, ListId, Task, TaskDraft, TaskId, TaskUpdate, TodoList};
use crate::domain::column::Column;
use crate::domain::remote::RemoteStore;
use crate::error::{Action, BrelloError, Result};

/// What a drop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Cancelled, or dropped back on its own slot. Nothing was sent.
    Unchanged,
    Persisted,
}

/// The state behind the board screen: the user's boards plus the selected
/// board's lists and tasks.
///
/// Mutators send the request first and only touch local state once it
/// succeeds. Drops are the exception: they apply immediately and are undone
/// (and re-fetched) if the server refuses them.
///
/// Every mutator takes `&mut self` for its whole request, so one workspace
/// runs one mutation at a time and responses apply in the order they were
/// asked for.
pub struct BoardWorkspace<S: RemoteStore> {
    store: S,
    boards: Vec<Board>,
    state: WorkspaceState,
    loading: bool,
}

impl<S: RemoteStore> BoardWorkspace<S> {
    pub fn new(store: S) -> Self {
        Self { store, boards: Vec::new(), state: WorkspaceState::default(), loading: false }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn selected_board(&self) -> Option<&Board> {
        self.state.board()
    }

    pub fn columns(&self) -> &[Column] {
        self.state.columns()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn load_boards(&mut self) -> Result<&[Board]> {
        self.boards = self.store.list_boards().await.map_err(|e| BrelloError::request(Action::FetchBoards, e))?;
        debug!(count = self.boards.len(), "boards loaded");
        Ok(&self.boards)
    }

    pub async fn create_board(&mut self, title: &str, background_color: &str) -> Result<Board> {
        let draft = BoardDraft { title: title.to_string(), background_color: background_color.to_string() };
        let board = self
            .store
            .create_board(&draft)
            .await
            .map_err(|e| BrelloError::request(Action::CreateBoard, e))?;
        info!(board_id = %board.id, "board created");
        self.boards.push(board.clone());
        Ok(board)
    }

    pub async fn edit_board(&mut self, id: BoardId, title: &str, background_color: &str) -> Result<Board> {
        if !self.boards.iter().any(|b| b.id == id) {
            return Err(BrelloError::BoardNotFound(id));
        }
        let draft = BoardDraft { title: title.to_string(), background_color: background_color.to_string() };
        let board = self
            .store
            .update_board(id, &draft)
            .await
            .map_err(|e| BrelloError::request(Action::UpdateBoard, e))?;
        if let Some(slot) = self.boards.iter_mut().find(|b| b.id == id) {
            *slot = board.clone();
        }
        self.state.update_board(board.clone());
        Ok(board)
    }

    pub async fn delete_board(&mut self, id: BoardId) -> Result<()> {
        if !self.boards.iter().any(|b| b.id == id) {
            return Err(BrelloError::BoardNotFound(id));
        }
        self.store.delete_board(id).await.map_err(|e| BrelloError::request(Action::DeleteBoard, e))?;
        info!(board_id = %id, "board deleted");
        self.boards.retain(|b| b.id != id);
        if self.state.board_id() == Some(id) {
            self.state.clear();
        }
        Ok(())
    }

    pub async fn share_board(&self, id: BoardId, email: &str) -> Result<()> {
        self.store.share_board(id, email).await.map_err(|e| BrelloError::request(Action::ShareBoard, e))?;
        info!(board_id = %id, "board shared");
        Ok(())
    }

    /// Makes `board` current and fetches its lists and tasks.
    #[instrument(skip(self, board), fields(board_id = %board.id))]
    pub async fn select_board(&mut self, board: Board) -> Result<()> {
        self.begin_select(board);
        self.finish_select().await
    }

    /// First half of [`select_board`](Self::select_board): drops the previous
    /// board's lists and tasks and marks the workspace as loading, so a caller
    /// can draw the loading state before the fetch starts.
    pub fn begin_select(&mut self, board: Board) {
        self.state.select(board);
        self.loading = true;
    }

    /// Second half of [`select_board`](Self::select_board): fetches the
    /// selected board's lists and tasks and clears the loading flag.
    pub async fn finish_select(&mut self) -> Result<()> {
        let fetched = match self.require_board() {
            Ok(id) => self.fetch_columns(id).await,
            Err(err) => Err(err),
        };
        self.loading = false;
        let columns = fetched?;
        debug!(lists = columns.len(), "board loaded");
        self.state.load(columns);
        Ok(())
    }

    /// Replaces the selected board's lists and tasks with what the server holds.
    pub async fn refresh(&mut self) -> Result<()> {
        let id = self.require_board()?;
        let columns = self.fetch_columns(id).await?;
        self.state.load(columns);
        Ok(())
    }

    async fn resync(&mut self) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "resynchronisation failed, keeping local state");
        }
    }

    pub async fn create_list(&mut self, title: &str) -> Result<TodoList> {
        let board = self.require_board()?;
        let draft = ListDraft { title: title.to_string() };
        let list = self
            .store
            .create_list(board, &draft)
            .await
            .map_err(|e| BrelloError::request(Action::CreateTodoList, e))?;
        info!(list_id = %list.id, board_id = %board, "todo list created");
        self.state.push_list(list.clone());
        Ok(list)
    }

    pub async fn edit_list(&mut self, id: ListId, title: &str) -> Result<TodoList> {
        self.require_list(id)?;
        let draft = ListDraft { title: title.to_string() };
        let list = self
            .store
            .update_list(id, &draft)
            .await
            .map_err(|e| BrelloError::request(Action::UpdateTodoList, e))?;
        self.state.replace_list(list.clone());
        Ok(list)
    }

    /// Deletes a list. Its tasks leave the workspace with it; the server
    /// deletes them too.
    pub async fn delete_list(&mut self, id: ListId) -> Result<()> {
        self.require_list(id)?;
        self.store.delete_list(id).await.map_err(|e| BrelloError::request(Action::DeleteTodoList, e))?;
        if let Some(column) = self.state.remove_list(id) {
            info!(list_id = %id, tasks = column.len(), "todo list deleted");
        }
        Ok(())
    }

    pub async fn create_task(&mut self, list: ListId, title: &str, description: Option<&str>) -> Result<Task> {
        self.require_list(list)?;
        let draft = TaskDraft { title: title.to_string(), description: description.map(str::to_string) };
        let task = self
            .store
            .create_task(list, &draft)
            .await
            .map_err(|e| BrelloError::request(Action::CreateTask, e))?;
        if task.todo_list_id == list {
            self.state.push_task(task.clone())?;
        } else {
            warn!(task_id = %task.id, expected = %list, got = %task.todo_list_id, "server placed task in another list");
            self.resync().await;
        }
        info!(task_id = %task.id, list_id = %task.todo_list_id, "task created");
        Ok(task)
    }

    /// Updates a task in place. If the server reports it in a different list
    /// than the one shown, the board is re-fetched instead.
    pub async fn edit_task(&mut self, id: TaskId, title: &str, description: Option<&str>) -> Result<Task> {
        self.require_task(id)?;
        let update = TaskUpdate { title: title.to_string(), description: description.map(str::to_string), todo_list_id: None };
        let task = self
            .store
            .update_task(id, &update)
            .await
            .map_err(|e| BrelloError::request(Action::UpdateTask, e))?;
        if !self.state.replace_task(task.clone()) {
            warn!(task_id = %id, list_id = %task.todo_list_id, "edited task is not where it was shown");
            self.resync().await;
        }
        Ok(task)
    }

    pub async fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.require_task(id)?;
        self.store.delete_task(id).await.map_err(|e| BrelloError::request(Action::DeleteTask, e))?;
        self.state.remove_task(id);
        info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Commits a drag gesture.
    ///
    /// The new order is visible before the request is sent. If the server
    /// rejects it the local change is reverted and the board is re-fetched;
    /// the returned error is the one from the rejected request.
    #[instrument(skip(self), fields(task_id = %gesture.task_id))]
    pub async fn drop_task(&mut self, gesture: DragGesture) -> Result<DropOutcome> {
        let Some(plan) = reorder::plan(&self.state, &gesture)? else {
            return Ok(DropOutcome::Unchanged);
        };
        let pending = PendingMutation::apply(&mut self.state, |state| plan.apply(state))?;

        match plan.persist(&self.store).await {
            Ok(()) => {
                pending.commit();
                debug!("drop persisted");
                Ok(DropOutcome::Persisted)
            }
            Err(err) => {
                warn!(error = %err, "drop rejected, resynchronising");
                pending.revert(&mut self.state);
                self.resync().await;
                Err(BrelloError::request(Action::MoveTask, err))
            }
        }
    }

    async fn fetch_columns(&self, board: BoardId) -> Result<Vec<Column>> {
        let lists = self
            .store
            .list_lists(board)
            .await
            .map_err(|e| BrelloError::request(Action::FetchTodoLists, e))?;
        let mut columns = Vec::with_capacity(lists.len());
        for list in lists {
            let tasks = self
                .store
                .list_tasks(list.id)
                .await
                .map_err(|e| BrelloError::request(Action::FetchTodoLists, e))?;
            columns.push(Column::with_tasks(list, tasks));
        }
        Ok(columns)
    }

    fn require_board(&self) -> Result<BoardId> {
        self.state.board_id().ok_or(BrelloError::NoBoardSelected)
    }

    fn require_list(&self, id: ListId) -> Result<()> {
        self.require_board()?;
        self.state.column(id).map(|_| ()).ok_or(BrelloError::ListNotFound(id))
    }

    fn require_task(&self, id: TaskId) -> Result<()> {
        self.require_board()?;
        self.state.task(id).map(|_| ()).ok_or(BrelloError::TaskNotFound(id))
    }
}

//! In-memory backing store for the development API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use super::types::ApiError;
use crate::domain::account::{Account, Credentials, LoginForm, TokenResponse};
use crate::domain::board::{Board, BoardDraft, BoardId, ListDraft, ListId, Task, TaskDraft, TaskId, TaskUpdate, TodoList};

const CONFIRMATION_TTL_HOURS: i64 = 24;

pub type UserId = i64;

/// A confirmation mail the development API would have sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub token: String,
}

struct User {
    id: UserId,
    email: String,
    password: String,
    is_active: bool,
}

struct Confirmation {
    email: String,
    expires_at: DateTime<Utc>,
}

struct BoardRow {
    board: Board,
    owner: UserId,
    shared_with: Vec<UserId>,
}

impl BoardRow {
    fn visible_to(&self, user: UserId) -> bool {
        self.owner == user || self.shared_with.contains(&user)
    }
}

#[derive(Default)]
pub struct DevStore {
    next_id: i64,
    users: Vec<User>,
    access_tokens: HashMap<String, UserId>,
    confirmations: HashMap<String, Confirmation>,
    boards: Vec<BoardRow>,
    lists: Vec<TodoList>,
    // a list's task order is the order its tasks appear in here
    tasks: Vec<Task>,
    outbox: Vec<OutboundEmail>,
}

/// Shared handle used as the axum router state.
#[derive(Clone, Default)]
pub struct DevApi {
    inner: Arc<Mutex<DevStore>>,
}

impl DevApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn store(&self) -> MutexGuard<'_, DevStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn outbox(&self) -> Vec<OutboundEmail> {
        self.store().outbox.clone()
    }

    /// Token from the latest confirmation mail sent to `email`.
    pub fn confirmation_token_for(&self, email: &str) -> Option<String> {
        self.store().outbox.iter().rev().find(|m| m.to == email).map(|m| m.token.clone())
    }
}

impl DevStore {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn signup(&mut self, credentials: Credentials, now: DateTime<Utc>) -> Result<Account, ApiError> {
        let email = credentials.email.trim().to_lowercase();
        if !email.contains('@') || credentials.password.is_empty() {
            return Err(ApiError::bad_request("A valid email and a password are required"));
        }
        if self.users.iter().any(|u| u.email == email) {
            return Err(ApiError::bad_request("Email already registered"));
        }
        let id = self.next_id();
        self.users.push(User { id, email: email.clone(), password: credentials.password, is_active: false });

        let token = Uuid::new_v4().to_string();
        self.confirmations.insert(
            token.clone(),
            Confirmation { email: email.clone(), expires_at: now + Duration::hours(CONFIRMATION_TTL_HOURS) },
        );
        info!(user_id = id, %email, confirm_path = %format!("/confirm/{token}"), "confirmation email queued");
        self.outbox.push(OutboundEmail { to: email.clone(), token });
        Ok(Account { id, email, is_active: false })
    }

    pub fn confirm(&mut self, token: &str, now: DateTime<Utc>) -> Result<String, ApiError> {
        let confirmation = self
            .confirmations
            .get(token)
            .ok_or_else(|| ApiError::bad_request("Invalid confirmation link"))?;
        if confirmation.expires_at < now {
            return Err(ApiError::bad_request("Confirmation link has expired"));
        }
        let email = confirmation.email.clone();
        let user = self
            .users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        if user.is_active {
            return Ok("Email already confirmed".to_string());
        }
        user.is_active = true;
        info!(user_id = user.id, "email confirmed");
        Ok("Email confirmed successfully".to_string())
    }

    pub fn login(&mut self, form: LoginForm) -> Result<TokenResponse, ApiError> {
        let email = form.username.trim().to_lowercase();
        let user = self
            .users
            .iter()
            .find(|u| u.email == email && u.password == form.password)
            .ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;
        if !user.is_active {
            return Err(ApiError::unauthorized("Email not confirmed"));
        }
        let user_id = user.id;
        let token = Uuid::new_v4().to_string();
        self.access_tokens.insert(token.clone(), user_id);
        Ok(TokenResponse { access_token: token, token_type: "bearer".to_string() })
    }

    pub fn authenticate(&self, bearer: Option<&str>) -> Result<UserId, ApiError> {
        bearer
            .and_then(|token| self.access_tokens.get(token).copied())
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
    }

    pub fn boards(&self, user: UserId) -> Vec<Board> {
        self.boards.iter().filter(|row| row.visible_to(user)).map(|row| row.board.clone()).collect()
    }

    pub fn create_board(&mut self, user: UserId, draft: BoardDraft) -> Board {
        let board = Board { id: BoardId(self.next_id()), title: draft.title, background_color: draft.background_color };
        self.boards.push(BoardRow { board: board.clone(), owner: user, shared_with: Vec::new() });
        board
    }

    pub fn update_board(&mut self, user: UserId, id: BoardId, draft: BoardDraft) -> Result<Board, ApiError> {
        let row = self.owned_board(user, id)?;
        row.board.title = draft.title;
        row.board.background_color = draft.background_color;
        Ok(row.board.clone())
    }

    pub fn delete_board(&mut self, user: UserId, id: BoardId) -> Result<(), ApiError> {
        self.owned_board(user, id)?;
        self.boards.retain(|row| row.board.id != id);
        let lists: Vec<ListId> = self.lists.iter().filter(|l| l.board_id == id).map(|l| l.id).collect();
        self.lists.retain(|l| l.board_id != id);
        self.tasks.retain(|t| !lists.contains(&t.todo_list_id));
        Ok(())
    }

    pub fn share_board(&mut self, user: UserId, id: BoardId, email: &str) -> Result<(), ApiError> {
        self.owned_board(user, id)?;
        let email = email.trim().to_lowercase();
        let target = self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        let row = self.owned_board(user, id)?;
        if target == user {
            return Err(ApiError::bad_request("Cannot share board with yourself"));
        }
        if row.shared_with.contains(&target) {
            return Err(ApiError::bad_request("Board already shared with this user"));
        }
        row.shared_with.push(target);
        Ok(())
    }

    pub fn lists(&self, user: UserId, board: BoardId) -> Result<Vec<TodoList>, ApiError> {
        self.visible_board(user, board)?;
        Ok(self.lists.iter().filter(|l| l.board_id == board).cloned().collect())
    }

    pub fn create_list(&mut self, user: UserId, board: BoardId, draft: ListDraft) -> Result<TodoList, ApiError> {
        self.visible_board(user, board)?;
        let list = TodoList { id: ListId(self.next_id()), title: draft.title, board_id: board };
        self.lists.push(list.clone());
        Ok(list)
    }

    pub fn update_list(&mut self, user: UserId, id: ListId, draft: ListDraft) -> Result<TodoList, ApiError> {
        self.visible_list(user, id)?;
        let list = self
            .lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| ApiError::not_found("Todo list not found"))?;
        list.title = draft.title;
        Ok(list.clone())
    }

    pub fn delete_list(&mut self, user: UserId, id: ListId) -> Result<(), ApiError> {
        self.visible_list(user, id)?;
        self.lists.retain(|l| l.id != id);
        self.tasks.retain(|t| t.todo_list_id != id);
        Ok(())
    }

    /// Puts a list's tasks in exactly the given order.
    pub fn reorder(&mut self, user: UserId, id: ListId, task_ids: &[TaskId]) -> Result<(), ApiError> {
        self.visible_list(user, id)?;
        let mut current: Vec<TaskId> = self.tasks.iter().filter(|t| t.todo_list_id == id).map(|t| t.id).collect();
        let mut wanted = task_ids.to_vec();
        current.sort();
        wanted.sort();
        if current != wanted {
            return Err(ApiError::bad_request("task_ids must list every task of the list exactly once"));
        }
        let (mut moving, rest): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|t| t.todo_list_id == id);
        self.tasks = rest;
        for task_id in task_ids {
            if let Some(index) = moving.iter().position(|t| t.id == *task_id) {
                self.tasks.push(moving.remove(index));
            }
        }
        Ok(())
    }

    pub fn tasks(&self, user: UserId, list: ListId) -> Result<Vec<Task>, ApiError> {
        self.visible_list(user, list)?;
        Ok(self.tasks.iter().filter(|t| t.todo_list_id == list).cloned().collect())
    }

    pub fn create_task(&mut self, user: UserId, list: ListId, draft: TaskDraft) -> Result<Task, ApiError> {
        self.visible_list(user, list)?;
        let task = Task { id: TaskId(self.next_id()), title: draft.title, description: draft.description, todo_list_id: list };
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Updates a task; a new `todo_list_id` moves it to the end of that list.
    pub fn update_task(&mut self, user: UserId, id: TaskId, update: TaskUpdate) -> Result<Task, ApiError> {
        let current = self.visible_task(user, id)?;
        if let Some(list) = update.todo_list_id {
            self.visible_list(user, list)?;
        }
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ApiError::not_found("Task not found"))?;
        let mut task = self.tasks.remove(index);
        task.title = update.title;
        task.description = update.description;
        match update.todo_list_id {
            Some(list) if list != current.todo_list_id => {
                task.todo_list_id = list;
                self.tasks.push(task.clone());
            }
            _ => self.tasks.insert(index, task.clone()),
        }
        Ok(task)
    }

    pub fn delete_task(&mut self, user: UserId, id: TaskId) -> Result<(), ApiError> {
        self.visible_task(user, id)?;
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    fn visible_board(&self, user: UserId, id: BoardId) -> Result<&BoardRow, ApiError> {
        self.boards
            .iter()
            .find(|row| row.board.id == id && row.visible_to(user))
            .ok_or_else(|| ApiError::not_found("Board not found"))
    }

    fn owned_board(&mut self, user: UserId, id: BoardId) -> Result<&mut BoardRow, ApiError> {
        self.boards
            .iter_mut()
            .find(|row| row.board.id == id && row.owner == user)
            .ok_or_else(|| ApiError::not_found("Board not found"))
    }

    fn visible_list(&self, user: UserId, id: ListId) -> Result<TodoList, ApiError> {
        let list = self
            .lists
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| ApiError::not_found("Todo list not found"))?;
        self.visible_board(user, list.board_id)
            .map_err(|_| ApiError::not_found("Todo list not found"))?;
        Ok(list.clone())
    }

    fn visible_task(&self, user: UserId, id: TaskId) -> Result<Task, ApiError> {
        let task = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::not_found("Task not found"))?;
        self.visible_list(user, task.todo_list_id)
            .map_err(|_| ApiError::not_found("Task not found"))?;
        Ok(task.clone())
    }
}

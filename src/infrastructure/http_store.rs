use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::{
    board::{Board, BoardDraft, BoardId, ListDraft, ListId, ReorderRequest, ShareRequest, Task, TaskDraft, TaskId, TaskUpdate, TodoList},
    remote::RemoteStore,
    session::Session,
};
use crate::error::{BrelloError, RemoteError, Result};

/// [`RemoteStore`] over the Brello REST API.
#[derive(Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpRemoteStore {
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self> {
        Ok(Self { client: build_client(config)?, base_url: config.api_url.clone(), session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drops the credential; later requests go out unauthenticated.
    pub fn sign_out(&mut self) {
        self.session.sign_out();
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "api request");
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match self.session.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

pub(crate) fn build_client(config: &ClientConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| BrelloError::ConfigError(format!("cannot build HTTP client: {e}")))
}

pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> std::result::Result<T, RemoteError> {
    let response = check_status(send(request).await?).await?;
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() { RemoteError::Decode(e.to_string()) } else { RemoteError::Network(e.to_string()) }
    })
}

pub(crate) async fn send_empty(request: RequestBuilder) -> std::result::Result<(), RemoteError> {
    check_status(send(request).await?).await?;
    Ok(())
}

async fn send(request: RequestBuilder) -> std::result::Result<Response, RemoteError> {
    request.send().await.map_err(|e| RemoteError::Network(e.to_string()))
}

async fn check_status(response: Response) -> std::result::Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status { status: status.as_u16(), message: error_message(status, &body) })
}

/// Picks the server's explanation out of an error body: `detail`, then
/// `message`, then the raw text, then the status reason.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|value| {
        ["detail", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
    });
    if let Some(message) = from_json {
        return message;
    }
    let body = body.trim();
    if !body.is_empty() && !body.starts_with('{') {
        return body.to_string();
    }
    status.canonical_reason().unwrap_or("request failed").to_string()
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_boards(&self) -> std::result::Result<Vec<Board>, RemoteError> {
        send_json(self.request(Method::GET, "/boards")).await
    }

    async fn create_board(&self, draft: &BoardDraft) -> std::result::Result<Board, RemoteError> {
        send_json(self.request(Method::POST, "/boards").json(draft)).await
    }

    async fn update_board(&self, id: BoardId, draft: &BoardDraft) -> std::result::Result<Board, RemoteError> {
        send_json(self.request(Method::PUT, &format!("/boards/{id}")).json(draft)).await
    }

    async fn delete_board(&self, id: BoardId) -> std::result::Result<(), RemoteError> {
        send_empty(self.request(Method::DELETE, &format!("/boards/{id}"))).await
    }

    async fn share_board(&self, id: BoardId, email: &str) -> std::result::Result<(), RemoteError> {
        let body = ShareRequest { email: email.to_string() };
        send_empty(self.request(Method::POST, &format!("/boards/{id}/share")).json(&body)).await
    }

    async fn list_lists(&self, board: BoardId) -> std::result::Result<Vec<TodoList>, RemoteError> {
        send_json(self.request(Method::GET, &format!("/boards/{board}/todo_lists"))).await
    }

    async fn create_list(&self, board: BoardId, draft: &ListDraft) -> std::result::Result<TodoList, RemoteError> {
        send_json(self.request(Method::POST, &format!("/boards/{board}/todo_lists")).json(draft)).await
    }

    async fn update_list(&self, id: ListId, draft: &ListDraft) -> std::result::Result<TodoList, RemoteError> {
        send_json(self.request(Method::PUT, &format!("/todo_lists/{id}")).json(draft)).await
    }

    async fn delete_list(&self, id: ListId) -> std::result::Result<(), RemoteError> {
        send_empty(self.request(Method::DELETE, &format!("/todo_lists/{id}"))).await
    }

    async fn reorder_list(&self, id: ListId, task_ids: &[TaskId]) -> std::result::Result<(), RemoteError> {
        let body = ReorderRequest { task_ids: task_ids.to_vec() };
        send_empty(self.request(Method::PUT, &format!("/todo_lists/{id}/reorder")).json(&body)).await
    }

    async fn list_tasks(&self, list: ListId) -> std::result::Result<Vec<Task>, RemoteError> {
        send_json(self.request(Method::GET, &format!("/todo_lists/{list}/tasks"))).await
    }

    async fn create_task(&self, list: ListId, draft: &TaskDraft) -> std::result::Result<Task, RemoteError> {
        send_json(self.request(Method::POST, &format!("/todo_lists/{list}/tasks")).json(draft)).await
    }

    async fn update_task(&self, id: TaskId, update: &TaskUpdate) -> std::result::Result<Task, RemoteError> {
        send_json(self.request(Method::PUT, &format!("/tasks/{id}")).json(update)).await
    }

    async fn delete_task(&self, id: TaskId) -> std::result::Result<(), RemoteError> {
        send_empty(self.request(Method::DELETE, &format!("/tasks/{id}"))).await
    }
}

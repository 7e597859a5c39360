pub mod account;
pub mod board;
pub mod column;
pub mod remote;
pub mod session;

pub use board::{Board, BoardDraft, BoardId, ListDraft, ListId, Task, TaskDraft, TaskId, TaskUpdate, TodoList};
pub use column::Column;
pub use remote::RemoteStore;
pub use session::Session;

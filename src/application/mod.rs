pub mod pending;
pub mod reorder;
pub mod state;
pub mod workspace;


pub use reorder::{DragGesture, DropSlot, ReorderPlan};
pub use state::WorkspaceState;
pub use workspace::{BoardWorkspace, DropOutcome};

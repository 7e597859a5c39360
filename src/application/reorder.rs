//! Turns a finished drag-and-drop gesture into a new task order and the
//! requests that persist it.
//!
//! Only the drop matters here: start and move events belong to whatever drives
//! the gesture. A drop is planned against the current state, applied locally
//! before any request goes out, and persisted afterwards.

use tracing::{debug, warn};

use crate::application::state::WorkspaceState;
use crate::domain::board::{ListId, Task, TaskId, TaskUpdate};
use crate::domain::remote::RemoteStore;
use crate::error::{BrelloError, RemoteError, Result};

/// A place in a list: the list and the index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropSlot {
    pub list_id: ListId,
    pub index: usize,
}

impl DropSlot {
    pub fn new(list_id: ListId, index: usize) -> Self {
        Self { list_id, index }
    }
}

/// The commit of a drag gesture. `destination` is `None` when the drop was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragGesture {
    pub task_id: TaskId,
    pub source: DropSlot,
    pub destination: Option<DropSlot>,
}

impl DragGesture {
    pub fn new(task_id: TaskId, source: DropSlot, destination: Option<DropSlot>) -> Self {
        Self { task_id, source, destination }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderPlan {
    WithinList {
        list_id: ListId,
        from: usize,
        to: usize,
        /// The list's full order after the move.
        task_ids: Vec<TaskId>,
    },
    AcrossLists {
        task: Task,
        from: DropSlot,
        to: DropSlot,
        /// The destination list's full order after the move.
        destination_ids: Vec<TaskId>,
    },
}

impl ReorderPlan {
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::WithinList { to, task_ids, .. } => task_ids[*to],
            Self::AcrossLists { task, .. } => task.id,
        }
    }

    /// Applies the move to local state.
    pub fn apply(&self, state: &mut WorkspaceState) -> Result<()> {
        match self {
            Self::WithinList { list_id, from, to, .. } => {
                let column = state.column_mut(*list_id).ok_or(BrelloError::ListNotFound(*list_id))?;
                column.move_within(*from, *to)
            }
            Self::AcrossLists { from, to, .. } => {
                let source = state.column_mut(from.list_id).ok_or(BrelloError::ListNotFound(from.list_id))?;
                let task = source.remove_at(from.index)?;
                let destination = state.column_mut(to.list_id).ok_or(BrelloError::ListNotFound(to.list_id))?;
                destination.insert(to.index, task)
            }
        }
    }

    /// Sends the requests that make the move durable.
    ///
    /// A cross-list move must update the task's list. Placing it at the right
    /// index in the destination is a second, best-effort request.
    pub async fn persist<S: RemoteStore + ?Sized>(&self, store: &S) -> std::result::Result<(), RemoteError> {
        match self {
            Self::WithinList { list_id, task_ids, .. } => store.reorder_list(*list_id, task_ids).await,
            Self::AcrossLists { task, to, destination_ids, .. } => {
                store.update_task(task.id, &TaskUpdate::move_to(task, to.list_id)).await?;
                if let Err(err) = store.reorder_list(to.list_id, destination_ids).await {
                    warn!(task_id = %task.id, list_id = %to.list_id, error = %err, "could not persist position in destination list");
                }
                Ok(())
            }
        }
    }
}

/// Works out what a drop means for `state`. `Ok(None)` means nothing to do.
pub fn plan(state: &WorkspaceState, gesture: &DragGesture) -> Result<Option<ReorderPlan>> {
    let Some(destination) = gesture.destination else {
        debug!(task_id = %gesture.task_id, "drop cancelled");
        return Ok(None);
    };
    let source = gesture.source;
    if destination == source {
        return Ok(None);
    }

    let source_column = state.column(source.list_id).ok_or(BrelloError::ListNotFound(source.list_id))?;
    let task = source_column.tasks().get(source.index).ok_or(BrelloError::InvalidPosition {
        list: source.list_id,
        index: source.index,
        len: source_column.len(),
    })?;
    if task.id != gesture.task_id {
        return Err(BrelloError::GestureMismatch { task: gesture.task_id, list: source.list_id, index: source.index });
    }

    if destination.list_id == source.list_id {
        if destination.index >= source_column.len() {
            return Err(BrelloError::InvalidPosition {
                list: source.list_id,
                index: destination.index,
                len: source_column.len(),
            });
        }
        let mut task_ids = source_column.task_ids();
        let moved = task_ids.remove(source.index);
        task_ids.insert(destination.index, moved);
        return Ok(Some(ReorderPlan::WithinList {
            list_id: source.list_id,
            from: source.index,
            to: destination.index,
            task_ids,
        }));
    }

    let destination_column =
        state.column(destination.list_id).ok_or(BrelloError::ListNotFound(destination.list_id))?;
    if destination.index > destination_column.len() {
        return Err(BrelloError::InvalidPosition {
            list: destination.list_id,
            index: destination.index,
            len: destination_column.len(),
        });
    }
    let mut destination_ids = destination_column.task_ids();
    destination_ids.insert(destination.index, task.id);
    let mut moved = task.clone();
    moved.todo_list_id = destination.list_id;
    Ok(Some(ReorderPlan::AcrossLists { task: moved, from: source, to: destination, destination_ids }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::state::fixtures::*;

    fn drag(task: i64, from: (i64, usize), to: Option<(i64, usize)>) -> DragGesture {
        DragGesture::new(
            TaskId(task),
            DropSlot::new(ListId(from.0), from.1),
            to.map(|(list, index)| DropSlot::new(ListId(list), index)),
        )
    }

    fn ids(raw: &[i64]) -> Vec<TaskId> {
        raw.iter().copied().map(TaskId).collect()
    }

    #[test]
    fn cancelled_drop_is_a_no_op() {
        let state = state_with(&[(1, &[1, 2])]);
        assert_eq!(plan(&state, &drag(1, (1, 0), None)).unwrap(), None);
    }

    #[test]
    fn drop_on_own_slot_is_a_no_op() {
        let state = state_with(&[(1, &[1, 2, 3])]);
        assert_eq!(plan(&state, &drag(2, (1, 1), Some((1, 1)))).unwrap(), None);
    }

    #[test]
    fn last_to_first_within_list() {
        let mut state = state_with(&[(1, &[1, 2, 3])]);
        let plan = plan(&state, &drag(3, (1, 2), Some((1, 0)))).unwrap().unwrap();
        assert_eq!(
            plan,
            ReorderPlan::WithinList { list_id: ListId(1), from: 2, to: 0, task_ids: ids(&[3, 1, 2]) }
        );
        assert_eq!(plan.task_id(), TaskId(3));

        plan.apply(&mut state).unwrap();
        assert_eq!(order(&state, 1), vec![3, 1, 2]);
    }

    #[test]
    fn within_list_moves_are_permutations() {
        let n = 6;
        let ids: Vec<i64> = (1..=n).collect();
        for i in 0..n as usize {
            for j in 0..n as usize {
                if i == j {
                    continue;
                }
                let mut state = state_with(&[(1, &ids[..])]);
                let task = ids[i];
                let plan = plan(&state, &drag(task, (1, i), Some((1, j)))).unwrap().unwrap();
                plan.apply(&mut state).unwrap();

                let mut after = order(&state, 1);
                assert_eq!(after[j], task);
                after.sort();
                assert_eq!(after, ids);
            }
        }
    }

    #[test]
    fn first_task_into_empty_list() {
        let mut state = state_with(&[(1, &[1, 2, 3]), (2, &[])]);
        let plan = plan(&state, &drag(1, (1, 0), Some((2, 0)))).unwrap().unwrap();
        match &plan {
            ReorderPlan::AcrossLists { task, destination_ids, .. } => {
                assert_eq!(task.todo_list_id, ListId(2));
                assert_eq!(destination_ids, &ids(&[1]));
            }
            other => panic!("unexpected plan {other:?}"),
        }

        plan.apply(&mut state).unwrap();
        assert_eq!(order(&state, 1), vec![2, 3]);
        assert_eq!(order(&state, 2), vec![1]);
        assert_eq!(state.task(TaskId(1)).unwrap().todo_list_id, ListId(2));
        assert!(state.is_consistent());
    }

    #[test]
    fn across_lists_inserts_without_overwriting() {
        let mut state = state_with(&[(1, &[1, 2]), (2, &[3, 4])]);
        let plan = plan(&state, &drag(2, (1, 1), Some((2, 1)))).unwrap().unwrap();
        plan.apply(&mut state).unwrap();
        assert_eq!(order(&state, 1), vec![1]);
        assert_eq!(order(&state, 2), vec![3, 2, 4]);
    }

    #[test]
    fn across_lists_may_append() {
        let mut state = state_with(&[(1, &[1]), (2, &[3, 4])]);
        let plan = plan(&state, &drag(1, (1, 0), Some((2, 2)))).unwrap().unwrap();
        plan.apply(&mut state).unwrap();
        assert_eq!(order(&state, 2), vec![3, 4, 1]);
    }

    #[test]
    fn out_of_range_destinations_are_rejected() {
        let state = state_with(&[(1, &[1, 2]), (2, &[])]);
        assert!(matches!(
            plan(&state, &drag(1, (1, 0), Some((1, 2)))),
            Err(BrelloError::InvalidPosition { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            plan(&state, &drag(1, (1, 0), Some((2, 1)))),
            Err(BrelloError::InvalidPosition { index: 1, len: 0, .. })
        ));
    }

    #[test]
    fn stale_gesture_is_rejected() {
        let state = state_with(&[(1, &[1, 2]), (2, &[])]);
        assert!(matches!(
            plan(&state, &drag(2, (1, 0), Some((2, 0)))),
            Err(BrelloError::GestureMismatch { index: 0, .. })
        ));
        assert!(matches!(plan(&state, &drag(1, (9, 0), Some((2, 0)))), Err(BrelloError::ListNotFound(ListId(9)))));
    }
}

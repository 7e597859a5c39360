use crate::application::state::WorkspaceState;
use crate::domain::column::Column;
use crate::error::Result;

/// Outcome of reverting a pending mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revert {
    /// Nothing changed since the mutation; the snapshot is back in place.
    Restored,
    /// A later change landed first; state was left alone and needs a re-fetch.
    Superseded,
}

/// A local change applied ahead of server confirmation.
///
/// Holds the columns as they were before the change. Committing drops the
/// snapshot; reverting puts it back unless something newer was applied since.
#[must_use = "a pending mutation must be committed or reverted"]
#[derive(Debug)]
pub struct PendingMutation {
    snapshot: Vec<Column>,
    applied_at: u64,
}

impl PendingMutation {
    /// Runs `mutate` against `state`. If it fails, state is rolled back on the spot.
    pub fn apply<F>(state: &mut WorkspaceState, mutate: F) -> Result<Self>
    where
        F: FnOnce(&mut WorkspaceState) -> Result<()>,
    {
        let snapshot = state.columns().to_vec();
        if let Err(err) = mutate(state) {
            state.load(snapshot);
            return Err(err);
        }
        state.touch();
        Ok(Self { snapshot, applied_at: state.revision() })
    }

    pub fn commit(self) {}

    pub fn revert(self, state: &mut WorkspaceState) -> Revert {
        if state.revision() != self.applied_at {
            return Revert::Superseded;
        }
        state.load(self.snapshot);
        Revert::Restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::state::fixtures::*;
    use crate::domain::board::ListId;
    use crate::error::BrelloError;

    #[test]
    fn revert_restores_snapshot() {
        let mut state = state_with(&[(1, &[1, 2, 3])]);
        let pending = PendingMutation::apply(&mut state, |s| {
            s.column_mut(ListId(1)).unwrap().move_within(2, 0)
        })
        .unwrap();
        assert_eq!(order(&state, 1), vec![3, 1, 2]);

        assert_eq!(pending.revert(&mut state), Revert::Restored);
        assert_eq!(order(&state, 1), vec![1, 2, 3]);
    }

    #[test]
    fn revert_after_newer_change_is_superseded() {
        let mut state = state_with(&[(1, &[1, 2, 3]), (2, &[])]);
        let first = PendingMutation::apply(&mut state, |s| {
            s.column_mut(ListId(1)).unwrap().move_within(0, 2)
        })
        .unwrap();
        let second = PendingMutation::apply(&mut state, |s| {
            let task = s.column_mut(ListId(1)).unwrap().remove_at(0)?;
            s.column_mut(ListId(2)).unwrap().insert(0, task)
        })
        .unwrap();
        assert_eq!(order(&state, 1), vec![3, 1]);
        assert_eq!(order(&state, 2), vec![2]);

        // the first request fails after the second was applied: keep the newer state
        assert_eq!(first.revert(&mut state), Revert::Superseded);
        assert_eq!(order(&state, 1), vec![3, 1]);
        assert_eq!(order(&state, 2), vec![2]);
        second.commit();
    }

    #[test]
    fn failed_apply_leaves_nothing_behind() {
        let mut state = state_with(&[(1, &[1, 2]), (2, &[])]);
        let err = PendingMutation::apply(&mut state, |s| {
            let task = s.column_mut(ListId(1)).unwrap().remove_at(0)?;
            s.column_mut(ListId(2)).unwrap().insert(5, task)
        })
        .unwrap_err();
        assert!(matches!(err, BrelloError::InvalidPosition { index: 5, .. }));
        assert_eq!(order(&state, 1), vec![1, 2]);
        assert!(order(&state, 2).is_empty());
    }
}

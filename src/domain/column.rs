use crate::domain::board::{ListId, Task, TaskId, TodoList};
use crate::error::{BrelloError, Result};

/// A todo list with its tasks in display order.
///
/// Every task held here has `todo_list_id == list.id`; insertion rewrites the
/// field so a task can never sit in one column while pointing at another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub list: TodoList,
    tasks: Vec<Task>,
}

impl Column {
    pub fn new(list: TodoList) -> Self {
        Self { list, tasks: Vec::new() }
    }

    pub fn with_tasks(list: TodoList, tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut column = Self::new(list);
        for task in tasks {
            column.push(task);
        }
        column
    }

    pub fn id(&self) -> ListId {
        self.list.id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn push(&mut self, mut task: Task) {
        task.todo_list_id = self.list.id;
        self.tasks.push(task);
    }

    /// Inserts at `index`, shifting later tasks back. `index == len` appends.
    pub fn insert(&mut self, index: usize, mut task: Task) -> Result<()> {
        if index > self.tasks.len() {
            return Err(self.out_of_range(index));
        }
        task.todo_list_id = self.list.id;
        self.tasks.insert(index, task);
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Task> {
        if index >= self.tasks.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.tasks.remove(index))
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.position_of(id)?;
        Some(self.tasks.remove(index))
    }

    /// Swaps in a new version of a task already held, keeping its position.
    /// A version that names another list is refused.
    pub fn replace(&mut self, task: Task) -> bool {
        if task.todo_list_id != self.list.id {
            return false;
        }
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    pub fn move_within(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tasks.len();
        if from >= len {
            return Err(self.out_of_range(from));
        }
        if to >= len {
            return Err(self.out_of_range(to));
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> BrelloError {
        BrelloError::InvalidPosition { list: self.list.id, index, len: self.tasks.len() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::BoardId;

    fn list(id: i64) -> TodoList {
        TodoList { id: ListId(id), title: format!("L{id}"), board_id: BoardId(1) }
    }

    fn task(id: i64, list: i64) -> Task {
        Task { id: TaskId(id), title: format!("T{id}"), description: None, todo_list_id: ListId(list) }
    }

    fn ids(column: &Column) -> Vec<i64> {
        column.tasks().iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn push_claims_the_task() {
        let mut column = Column::new(list(1));
        column.push(task(10, 99));
        assert_eq!(column.tasks()[0].todo_list_id, ListId(1));
    }

    #[test]
    fn insert_shifts_instead_of_overwriting() {
        let mut column = Column::with_tasks(list(1), [task(1, 1), task(2, 1)]);
        column.insert(1, task(3, 2)).unwrap();
        assert_eq!(ids(&column), vec![1, 3, 2]);
        assert_eq!(column.get(TaskId(3)).unwrap().todo_list_id, ListId(1));
    }

    #[test]
    fn insert_into_empty_column_at_zero() {
        let mut column = Column::new(list(2));
        column.insert(0, task(1, 1)).unwrap();
        assert_eq!(ids(&column), vec![1]);
    }

    #[test]
    fn insert_past_end_is_rejected() {
        let mut column = Column::new(list(2));
        let err = column.insert(1, task(1, 1)).unwrap_err();
        assert!(matches!(err, BrelloError::InvalidPosition { index: 1, len: 0, .. }));
        assert!(column.is_empty());
    }

    #[test]
    fn move_within_keeps_every_id_once() {
        let mut column = Column::with_tasks(list(1), (1..=5).map(|i| task(i, 1)));
        column.move_within(4, 1).unwrap();
        assert_eq!(ids(&column), vec![1, 5, 2, 3, 4]);
        column.move_within(0, 4).unwrap();
        assert_eq!(ids(&column), vec![5, 2, 3, 4, 1]);
    }

    #[test]
    fn move_within_rejects_bad_indices() {
        let mut column = Column::with_tasks(list(1), [task(1, 1)]);
        assert!(column.move_within(0, 1).is_err());
        assert!(column.move_within(1, 0).is_err());
        assert_eq!(ids(&column), vec![1]);
    }

    #[test]
    fn replace_keeps_position() {
        let mut column = Column::with_tasks(list(1), [task(1, 1), task(2, 1), task(3, 1)]);
        let mut edited = task(2, 1);
        edited.title = "renamed".into();
        assert!(column.replace(edited));
        assert_eq!(column.tasks()[1].title, "renamed");
        assert!(!column.replace(task(9, 1)));
    }

    #[test]
    fn replace_refuses_a_task_from_another_list() {
        let mut column = Column::with_tasks(list(1), [task(1, 1), task(2, 1)]);
        let mut moved = task(2, 7);
        moved.title = "elsewhere".into();
        assert!(!column.replace(moved));
        assert_eq!(column.tasks()[1], task(2, 1));
    }

    #[test]
    fn remove_by_id_and_index() {
        let mut column = Column::with_tasks(list(1), [task(1, 1), task(2, 1), task(3, 1)]);
        assert_eq!(column.remove(TaskId(2)).map(|t| t.id), Some(TaskId(2)));
        assert_eq!(column.remove(TaskId(2)), None);
        assert_eq!(column.remove_at(0).unwrap().id, TaskId(1));
        assert_eq!(ids(&column), vec![3]);
        assert_eq!(column.position_of(TaskId(3)), Some(0));
    }
}

use crate::models::TaskId;
use crate::registry;

/// Sidebar state: a highlighted cursor over the task ids and the confirmed
/// selection, which stays empty until the user picks something.
#[derive(Clone, Debug)]
pub struct Selector {
    ids: Vec<TaskId>,
    cursor: usize,
    selected: Option<TaskId>,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(registry::all_ids())
    }
}

impl Selector {
    pub fn new(ids: Vec<TaskId>) -> Self {
        Self {
            ids,
            cursor: 0,
            selected: None,
        }
    }

    pub fn ids(&self) -> &[TaskId] {
        &self.ids
    }

    pub fn labels(&self) -> Vec<String> {
        self.ids.iter().map(|id| id.label()).collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn highlighted(&self) -> Option<TaskId> {
        self.ids.get(self.cursor).copied()
    }

    pub fn current_selection(&self) -> Option<TaskId> {
        self.selected
    }

    pub fn next(&mut self) {
        if !self.ids.is_empty() {
            self.cursor = (self.cursor + 1) % self.ids.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.ids.is_empty() {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(self.ids.len() - 1);
        }
    }

    /// Selects the highlighted id. Returns it when the selection changed.
    pub fn confirm(&mut self) -> Option<TaskId> {
        let highlighted = self.highlighted()?;
        if self.selected == Some(highlighted) {
            return None;
        }
        self.selected = Some(highlighted);
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_is_selected_until_confirmed() {
        let mut selector = Selector::default();
        assert_eq!(selector.current_selection(), None);
        assert_eq!(selector.highlighted().map(TaskId::get), Some(1));

        selector.next();
        selector.next();
        assert_eq!(selector.current_selection(), None);
        assert_eq!(selector.confirm().map(TaskId::get), Some(3));
        assert_eq!(selector.current_selection().map(TaskId::get), Some(3));
    }

    #[test]
    fn cursor_wraps_in_both_directions() {
        let mut selector = Selector::default();
        selector.previous();
        assert_eq!(selector.highlighted().map(TaskId::get), Some(28));
        selector.next();
        assert_eq!(selector.highlighted().map(TaskId::get), Some(1));
    }

    #[test]
    fn confirming_the_same_task_twice_reports_no_change() {
        let mut selector = Selector::default();
        assert!(selector.confirm().is_some());
        assert!(selector.confirm().is_none());
        assert_eq!(selector.current_selection().map(TaskId::get), Some(1));
    }

    #[test]
    fn labels_follow_registry_order() {
        let labels = Selector::default().labels();
        assert_eq!(labels.len(), 28);
        assert_eq!(labels.first().map(String::as_str), Some("Task 1"));
        assert_eq!(labels.last().map(String::as_str), Some("Task 28"));
    }

    #[test]
    fn empty_selector_does_not_move() {
        let mut selector = Selector::new(Vec::new());
        selector.next();
        selector.previous();
        assert_eq!(selector.highlighted(), None);
        assert_eq!(selector.confirm(), None);
    }
}

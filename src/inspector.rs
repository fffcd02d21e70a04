//! Inspector bookkeeping: paging through stored samples and marking cells.
//!
//! The grid rendering itself is GUI glue; this module owns the state behind
//! it, as an explicit value instead of module-level globals so independent
//! sessions (or tests) cannot collide. Selected cells are samples marked for
//! deletion: they are skipped on export and can be dropped from the list.

use std::collections::HashSet;
use std::ops::Range;

use crate::sample::Sample;

/// What the inspector is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectorContext {
    /// Samples submitted in this session.
    Session,
    /// Samples loaded from a dataset file.
    Loaded(String),
}

/// Paging and selection state for the sample grid.
pub struct InspectorState {
    page_start: usize,
    page_size: usize,
    selected: HashSet<u64>,
    context: InspectorContext,
}

impl InspectorState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_start: 0,
            page_size: page_size.max(1),
            selected: HashSet::new(),
            context: InspectorContext::Session,
        }
    }

    pub fn context(&self) -> &InspectorContext {
        &self.context
    }

    /// Switches context, resetting the page and the selection; marks from
    /// one context never apply to another.
    pub fn set_context(&mut self, context: InspectorContext) {
        if self.context != context {
            self.context = context;
            self.page_start = 0;
            self.selected.clear();
        }
    }

    /// Index range of the samples visible on the current page, clamped to
    /// the list length.
    pub fn visible_range(&self, total: usize) -> Range<usize> {
        let start = self.page_start.min(total);
        start..(start + self.page_size).min(total)
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page_start + self.page_size < total {
            self.page_start += self.page_size;
        }
    }

    pub fn prev_page(&mut self) {
        self.page_start = self.page_start.saturating_sub(self.page_size);
    }

    /// Toggles the deletion mark on a sample.
    pub fn toggle(&mut self, sample_id: u64) {
        if !self.selected.remove(&sample_id) {
            self.selected.insert(sample_id);
        }
    }

    pub fn is_selected(&self, sample_id: u64) -> bool {
        self.selected.contains(&sample_id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Samples that survive the current deletion marks, in order. This is
    /// what export serializes.
    pub fn retained<'a>(&self, samples: &'a [Sample]) -> Vec<&'a Sample> {
        samples
            .iter()
            .filter(|sample| !self.selected.contains(&sample.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(n: u64) -> Vec<Sample> {
        (0..n)
            .map(|id| Sample::build(id, "\\sum", "U+2211", 300, 300, Vec::new()))
            .collect()
    }

    #[test]
    fn test_paging_clamps_at_both_ends() {
        let mut state = InspectorState::new(4);
        assert_eq!(state.visible_range(10), 0..4);

        state.prev_page(); // already at the first page
        assert_eq!(state.visible_range(10), 0..4);

        state.next_page(10);
        assert_eq!(state.visible_range(10), 4..8);
        state.next_page(10);
        assert_eq!(state.visible_range(10), 8..10);
        state.next_page(10); // no page beyond the last
        assert_eq!(state.visible_range(10), 8..10);

        state.prev_page();
        assert_eq!(state.visible_range(10), 4..8);
    }

    #[test]
    fn test_visible_range_shrinks_with_list() {
        let mut state = InspectorState::new(4);
        state.next_page(10);
        // The list shrank under the page (e.g. deletions): range stays valid.
        assert_eq!(state.visible_range(5), 4..5);
        assert_eq!(state.visible_range(2), 2..2);
    }

    #[test]
    fn test_toggle_and_retained() {
        let mut state = InspectorState::new(4);
        let list = samples(4);

        state.toggle(1);
        state.toggle(3);
        assert!(state.is_selected(1));
        assert_eq!(state.selected_count(), 2);

        let retained = state.retained(&list);
        let ids: Vec<u64> = retained.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 2]);

        state.toggle(1); // unmark
        assert_eq!(state.retained(&list).len(), 3);
    }

    #[test]
    fn test_context_switch_resets_marks_and_page() {
        let mut state = InspectorState::new(2);
        state.toggle(0);
        state.next_page(6);

        state.set_context(InspectorContext::Loaded("output-x.json".to_string()));
        assert_eq!(state.selected_count(), 0);
        assert_eq!(state.visible_range(6), 0..2);

        // Re-setting the same context keeps state.
        state.toggle(5);
        state.set_context(InspectorContext::Loaded("output-x.json".to_string()));
        assert_eq!(state.selected_count(), 1);
    }
}

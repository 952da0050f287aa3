//! Structural state shared by the renderer's event handlers.
//!
//! XWiki syntax separates top-level blocks with a blank line but separates
//! sibling and nested items (list items, definition items, quotation lines,
//! table rows) with a single newline. Whether a newline is due can only be
//! decided when the *next* construct begins, so each family records what it
//! has seen and answers with a [`Separator`] when asked.

use crate::event::ListType;

/// Separator owed before a construct starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Separator {
    None,
    /// A single `\n`, closing the previous item.
    NewLine,
    /// The inter-block blank line (skipped before the first block).
    Block,
}

/// Begun/ended flags of the items of one construct family.
#[derive(Debug, Default)]
struct ItemFlags {
    begun: bool,
    ended: bool,
}

impl ItemFlags {
    /// Whether an item was begun and has not ended yet.
    fn is_open(&self) -> bool {
        self.begun && !self.ended
    }

    /// Separator for a container opening; nested inside an open item it only
    /// needs a newline.
    fn open_container(&mut self) -> Separator {
        if self.is_open() {
            self.begun = false;
            Separator::NewLine
        } else {
            Separator::Block
        }
    }

    fn begin_item(&mut self) -> Separator {
        let separator = if self.ended {
            self.ended = false;
            self.begun = false;
            Separator::NewLine
        } else {
            Separator::None
        };
        self.begun = true;
        separator
    }

    fn end_item(&mut self) {
        self.ended = true;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Nested lists: one style entry per open list.
#[derive(Debug, Default)]
pub(crate) struct ListState {
    styles: Vec<ListType>,
    items: ItemFlags,
}

impl ListState {
    pub(crate) fn begin(&mut self, list_type: ListType) -> Separator {
        let separator = self.items.open_container();
        self.styles.push(list_type);
        separator
    }

    /// Close the innermost list. Returns `false` if no list was open.
    pub(crate) fn end(&mut self) -> bool {
        let closed = self.styles.pop().is_some();
        if self.styles.is_empty() {
            self.items.reset();
        }
        closed
    }

    pub(crate) fn begin_item(&mut self) -> Separator {
        self.items.begin_item()
    }

    pub(crate) fn end_item(&mut self) {
        self.items.end_item();
    }

    /// Whether a list item is open with no nested construct started yet.
    pub(crate) fn is_item_open(&self) -> bool {
        self.items.is_open()
    }

    pub(crate) fn depth(&self) -> usize {
        self.styles.len()
    }

    /// Item marker without the trailing space: one style character per
    /// level, then `.` when any level is numbered (`*`, `**`, `1.`, `*1.`).
    pub(crate) fn marker(&self) -> String {
        let mut marker: String = self
            .styles
            .iter()
            .map(|style| match style {
                ListType::Bulleted => '*',
                ListType::Numbered => '1',
            })
            .collect();
        if self.styles.contains(&ListType::Numbered) {
            marker.push('.');
        }
        marker
    }
}

/// Nesting counter shared by definition lists and quotations.
#[derive(Debug, Default)]
pub(crate) struct NestedState {
    depth: usize,
    items: ItemFlags,
}

impl NestedState {
    pub(crate) fn begin(&mut self) -> Separator {
        let separator = self.items.open_container();
        self.depth += 1;
        separator
    }

    /// Leave one level. Returns `false` (and stays at zero) if none was open.
    pub(crate) fn end(&mut self) -> bool {
        let Some(depth) = self.depth.checked_sub(1) else {
            return false;
        };
        self.depth = depth;
        if depth == 0 {
            self.items.reset();
        }
        true
    }

    pub(crate) fn begin_item(&mut self) -> Separator {
        self.items.begin_item()
    }

    pub(crate) fn end_item(&mut self) {
        self.items.end_item();
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}

/// One "a row has ended" flag per open table.
#[derive(Debug, Default)]
pub(crate) struct TableState {
    rows_ended: Vec<bool>,
}

impl TableState {
    pub(crate) fn begin(&mut self) {
        self.rows_ended.push(false);
    }

    pub(crate) fn end(&mut self) -> bool {
        self.rows_ended.pop().is_some()
    }

    pub(crate) fn begin_row(&self) -> Separator {
        if self.rows_ended.last().copied().unwrap_or(false) {
            Separator::NewLine
        } else {
            Separator::None
        }
    }

    /// Returns `false` if no table is open.
    pub(crate) fn end_row(&mut self) -> bool {
        match self.rows_ended.last_mut() {
            Some(ended) => {
                *ended = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.rows_ended.len()
    }
}

/// All structural state of one render pass.
#[derive(Debug, Default)]
pub(crate) struct StructureState {
    pub(crate) lists: ListState,
    pub(crate) definitions: NestedState,
    pub(crate) quotations: NestedState,
    pub(crate) tables: TableState,
    first_block_rendered: bool,
}

impl StructureState {
    /// Text of the inter-block separator. Empty for the very first block of
    /// the document; every later call returns a blank line.
    pub(crate) fn block_separator(&mut self) -> &'static str {
        if self.first_block_rendered {
            "\n\n"
        } else {
            self.first_block_rendered = true;
            ""
        }
    }

    /// Whether every family is back to its initial state.
    pub(crate) fn is_balanced(&self) -> bool {
        self.lists.depth() == 0
            && self.definitions.depth() == 0
            && self.quotations.depth() == 0
            && self.tables.depth() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_separator_skips_first() {
        let mut state = StructureState::default();
        assert_eq!(state.block_separator(), "");
        assert_eq!(state.block_separator(), "\n\n");
        assert_eq!(state.block_separator(), "\n\n");
    }

    #[test]
    fn test_sibling_items_need_newline() {
        let mut lists = ListState::default();
        assert_eq!(lists.begin(ListType::Bulleted), Separator::Block);
        assert_eq!(lists.begin_item(), Separator::None);
        lists.end_item();
        assert_eq!(lists.begin_item(), Separator::NewLine);
        lists.end_item();
        assert!(lists.end());
        assert_eq!(lists.depth(), 0);
    }

    #[test]
    fn test_nested_list_inside_open_item() {
        let mut lists = ListState::default();
        lists.begin(ListType::Bulleted);
        lists.begin_item();
        assert!(lists.is_item_open());
        assert_eq!(lists.begin(ListType::Numbered), Separator::NewLine);
        assert_eq!(lists.begin_item(), Separator::None);
        assert_eq!(lists.marker(), "*1.");
        lists.end_item();
        assert!(lists.end());
        assert_eq!(lists.marker(), "*");
        lists.end_item();
        assert!(lists.end());
        assert_eq!(lists.marker(), "");
    }

    #[test]
    fn test_flags_reset_when_outermost_list_closes() {
        let mut lists = ListState::default();
        lists.begin(ListType::Bulleted);
        lists.begin_item();
        lists.end_item();
        lists.end();

        // A later unrelated list starts fresh: block separator, no newline.
        assert_eq!(lists.begin(ListType::Bulleted), Separator::Block);
        assert_eq!(lists.begin_item(), Separator::None);
    }

    #[test]
    fn test_list_markers() {
        let mut lists = ListState::default();
        lists.begin(ListType::Bulleted);
        assert_eq!(lists.marker(), "*");
        lists.begin(ListType::Bulleted);
        assert_eq!(lists.marker(), "**");

        let mut lists = ListState::default();
        lists.begin(ListType::Numbered);
        assert_eq!(lists.marker(), "1.");
        lists.begin(ListType::Numbered);
        assert_eq!(lists.marker(), "11.");
    }

    #[test]
    fn test_unbalanced_end_is_clamped() {
        let mut lists = ListState::default();
        assert!(!lists.end());
        assert_eq!(lists.depth(), 0);

        let mut nested = NestedState::default();
        assert!(!nested.end());
        assert_eq!(nested.depth(), 0);

        let mut tables = TableState::default();
        assert!(!tables.end());
        assert!(!tables.end_row());
        assert_eq!(tables.begin_row(), Separator::None);
    }

    #[test]
    fn test_nested_state_depth() {
        let mut quotes = NestedState::default();
        assert_eq!(quotes.begin(), Separator::Block);
        assert_eq!(quotes.begin_item(), Separator::None);
        assert_eq!(quotes.begin(), Separator::NewLine);
        assert_eq!(quotes.depth(), 2);
        assert!(quotes.end());
        assert!(quotes.end());
        assert_eq!(quotes.depth(), 0);
    }

    #[test]
    fn test_table_rows_per_table() {
        let mut tables = TableState::default();
        tables.begin();
        assert_eq!(tables.begin_row(), Separator::None);
        assert!(tables.end_row());
        assert_eq!(tables.begin_row(), Separator::NewLine);

        // A nested table tracks its own rows.
        tables.begin();
        assert_eq!(tables.begin_row(), Separator::None);
        assert!(tables.end());
        assert_eq!(tables.begin_row(), Separator::NewLine);
        assert!(tables.end());
        assert_eq!(tables.depth(), 0);
    }

    #[test]
    fn test_is_balanced() {
        let mut state = StructureState::default();
        assert!(state.is_balanced());
        state.quotations.begin();
        assert!(!state.is_balanced());
        state.quotations.end();
        assert!(state.is_balanced());
    }
}

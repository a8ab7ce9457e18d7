use std::collections::HashMap;

use crate::sheet::Cell;

/// Case-insensitive, whitespace-trimmed lookup from header label to column.
///
/// Built once per sheet read. When a label repeats, the leftmost column wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(header_row: &[Cell]) -> Self {
        let mut columns = HashMap::new();
        for (idx, cell) in header_row.iter().enumerate() {
            if let Some(label) = cell.as_text() {
                columns.entry(normalize_label(&label)).or_insert(idx);
            }
        }
        Self { columns }
    }

    /// Column of the leftmost header cell matching any of `aliases`.
    pub fn resolve<S: AsRef<str>>(&self, aliases: &[S]) -> Option<usize> {
        aliases
            .iter()
            .filter_map(|a| self.columns.get(&normalize_label(a.as_ref())).copied())
            .min()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One-shot form of [`HeaderIndex::resolve`].
pub fn resolve_column<S: AsRef<str>>(header_row: &[Cell], aliases: &[S]) -> Option<usize> {
    HeaderIndex::new(header_row).resolve(aliases)
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

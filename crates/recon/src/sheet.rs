//! In-memory workbook abstraction the pipeline reads from.
//!
//! A [`Workbook`] is produced once per uploaded file by the tabular reader
//! (see `revsplit-io`) and discarded after extraction. Nothing here mutates
//! after construction.

use chrono::NaiveDateTime;

/// A single cell value as the spreadsheet stored it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl Cell {
    /// Empty cells and whitespace-only text both count as "no value".
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual form, or `None` when the cell carries no value.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            Cell::Empty => return None,
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Cell::Date(dt) => dt.date().format("%Y-%m-%d").to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Finite numeric value. Text is accepted when it reads as a plain
    /// amount, optionally with a currency symbol, thousands separators or
    /// accounting-style parentheses.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => parse_amount_text(s)?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

fn parse_amount_text(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// A named 2-D grid of cells, `rows[row][col]`, 0-indexed. Rows may be ragged.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn header(&self) -> &[Cell] {
        self.rows.first().map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Rows below the header.
    pub fn data_rows(&self) -> &[Vec<Cell>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }
}

/// Ordered set of named sheets from one uploaded file.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// First sheet whose trimmed name equals one of `names`.
    pub fn sheet_named(&self, names: &[String]) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| names.iter().any(|n| s.name.trim() == n.as_str()))
    }
}

/// True when every cell of the row is empty.
pub(crate) fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_empty)
}

/// Fetch a cell from a possibly short row.
pub(crate) fn cell_at(row: &[Cell], col: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(col).unwrap_or(&EMPTY)
}

//! Tabular result type returned by the data provider.
//!
//! Baostock-style query results are column-oriented tables of strings. Tools
//! render them as markdown for MCP clients.

/// A provider query result: column names plus string-valued rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataFrame {
    /// Column names, in provider order.
    pub columns: Vec<String>,

    /// Data rows. Every row has one cell per column.
    pub rows: Vec<Vec<String>>,
}

impl DataFrame {
    /// Create an empty frame with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the frame has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Vec<&str> {
        match self.column_index(name) {
            Some(idx) => self
                .rows
                .iter()
                .filter_map(|row| row.get(idx).map(String::as_str))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Render the frame as a markdown table, truncated to `max_rows`.
    ///
    /// Truncation appends a note with the full row count so clients know the
    /// table is partial.
    pub fn to_markdown(&self, max_rows: usize) -> String {
        let mut out = String::new();

        out.push_str("| ");
        out.push_str(&self.columns.join(" | "));
        out.push_str(" |\n|");
        for _ in &self.columns {
            out.push_str(" --- |");
        }
        out.push('\n');

        for row in self.rows.iter().take(max_rows) {
            out.push_str("| ");
            out.push_str(&row.join(" | "));
            out.push_str(" |\n");
        }

        if self.rows.len() > max_rows {
            out.push_str(&format!(
                "\n_Showing first {} of {} rows._\n",
                max_rows,
                self.rows.len()
            ));
        }

        out
    }
}

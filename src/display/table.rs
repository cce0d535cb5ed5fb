//! Plain-text tables
//!
//! Columns are padded by character count, so box-drawing tree prefixes line
//! up the same as ASCII text.

/// Column alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A simple table with a header row and a dashed rule under it
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table with left-aligned columns
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let align = vec![Align::Left; headers.len()];
        Self {
            headers,
            align,
            rows: Vec::new(),
        }
    }

    /// Right-align the given columns
    pub fn align_right(mut self, columns: &[usize]) -> Self {
        for &col in columns {
            if let Some(a) = self.align.get_mut(col) {
                *a = Align::Right;
            }
        }
        self
    }

    /// Append a row; missing cells render empty
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Render the table, one line per row, each ending in a newline
    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .chain(std::iter::once(&self.headers[col]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();
        self.render_line(&mut output, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.render_line(&mut output, &rule, &widths);
        for row in &self.rows {
            self.render_line(&mut output, row, &widths);
        }
        output
    }

    fn render_line(&self, output: &mut String, cells: &[String], widths: &[usize]) {
        let line: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, &width)| {
                let cell = cells.get(col).map(String::as_str).unwrap_or("");
                let pad = " ".repeat(width.saturating_sub(cell.chars().count()));
                match self.align[col] {
                    Align::Left => format!("{}{}", cell, pad),
                    Align::Right => format!("{}{}", pad, cell),
                }
            })
            .collect();
        output.push_str(line.join("  ").trim_end());
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_by_chars() {
        let mut table = Table::new(["account", "amount"]).align_right(&[1]);
        table.push_row(vec!["Expenses".into(), "$8.00".into()]);
        table.push_row(vec!["└── Food".into(), "-$10.00".into()]);

        assert_eq!(
            table.render(),
            "account    amount\n\
             --------  -------\n\
             Expenses    $8.00\n\
             └── Food  -$10.00\n"
        );
    }

    #[test]
    fn test_missing_cells_render_empty() {
        let mut table = Table::new(["a", "b"]);
        table.push_row(vec!["x".into()]);
        assert_eq!(table.render(), "a  b\n-  -\nx\n");
    }
}

use std::fmt;

/// Placeholder for an empty cell, so every row has the same number of
/// whitespace-separated fields.
const EMPTY_CELL: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Column {
    title: &'static str,
    align: Align,
}

impl Column {
    pub(crate) const fn left(title: &'static str) -> Column {
        Column {
            title,
            align: Align::Left,
        }
    }

    /// For counts.
    pub(crate) const fn right(title: &'static str) -> Column {
        Column {
            title,
            align: Align::Right,
        }
    }
}

/// A listing laid out in aligned columns. Titles never contain whitespace
/// and empty cells print as `-`, so the output splits cleanly with `awk`.
pub(crate) struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    print_header: bool,
}

impl Table {
    pub(crate) fn new(columns: Vec<Column>) -> Table {
        if let Some(column) = columns
            .iter()
            .find(|c| c.title.contains(char::is_whitespace))
        {
            panic!("column title {:?} contains whitespace", column.title);
        }

        Table {
            columns,
            rows: Vec::new(),
            print_header: true,
        }
    }

    pub(crate) fn print_header(&mut self, print_header: bool) {
        self.print_header = print_header;
    }

    pub(crate) fn add_row(&mut self, cells: Vec<String>) {
        if cells.len() != self.columns.len() {
            panic!(
                "table has {} columns but a row with {} cells was added",
                self.columns.len(),
                cells.len()
            );
        }

        let cells = cells
            .into_iter()
            .map(|cell| match cell.trim() {
                "" => EMPTY_CELL.to_string(),
                _ => cell,
            })
            .collect();

        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(self.print_header.then(|| column.title.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn write_line<'a, I>(&self, f: &mut fmt::Formatter<'_>, widths: &[usize], cells: I) -> fmt::Result
    where
        I: Iterator<Item = &'a str>,
    {
        let last = self.columns.len().saturating_sub(1);

        for (i, cell) in cells.enumerate() {
            let width = widths[i];

            match self.columns[i].align {
                Align::Right => write!(f, "{cell:>width$}")?,
                // nothing to line up after the last column
                Align::Left if i == last => f.write_str(cell)?,
                Align::Left => write!(f, "{cell:<width$}")?,
            }

            if i != last {
                f.write_str("  ")?;
            }
        }

        writeln!(f)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();

        if self.print_header {
            self.write_line(f, &widths, self.columns.iter().map(|c| c.title))?;
        }

        for row in &self.rows {
            self.write_line(f, &widths, row.iter().map(String::as_str))?;
        }

        Ok(())
    }
}

pub(crate) trait IntoTable: Into<Table> + Sized {
    fn into_table(self) -> Table {
        self.into()
    }
}

impl<T> IntoTable for T where T: Into<Table> + Sized {}

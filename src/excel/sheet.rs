use crate::excel::Cell;

/// A single named page of a workbook.
///
/// The grid is rectangular and absolutely addressed: `rows[0][0]` is the A1
/// cell even when the used range of the sheet starts further down or right.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
    pub nrows: usize,
    pub ncols: usize,
}

impl Sheet {
    pub fn new(name: impl Into<String>, nrows: usize, ncols: usize) -> Self {
        Self {
            name: name.into(),
            rows: vec![vec![Cell::empty(); ncols]; nrows],
            nrows,
            ncols,
        }
    }

    /// Build a sheet from ragged rows, padding short rows with empty cells.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let nrows = rows.len();
        let ncols = rows.iter().map(Vec::len).max().unwrap_or(0);

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize_with(ncols, Cell::empty);
                row
            })
            .collect();

        Self {
            name: name.into(),
            rows,
            nrows,
            ncols,
        }
    }

    pub fn row(&self, rx: usize) -> Option<&[Cell]> {
        self.rows.get(rx).map(Vec::as_slice)
    }

    pub fn cell(&self, rx: usize, cx: usize) -> Option<&Cell> {
        self.rows.get(rx).and_then(|row| row.get(cx))
    }

    pub fn header(&self) -> Option<&[Cell]> {
        self.row(0)
    }

    pub fn body_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().skip(1).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.nrows == 0
    }
}

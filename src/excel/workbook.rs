use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use log::debug;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::excel::{Cell, CellType, DataTypeInfo, Sheet, format_number};

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path_ref = path.as_ref();

    let mut workbook = open_workbook_auto(path_ref)
        .with_context(|| format!("Unable to parse Excel file: {}", path_ref.display()))?;

    let sheets = read_all_sheets(&mut workbook)?;
    Ok(Workbook::from_sheets(sheets))
}

pub fn open_workbook_from_bytes(content: &[u8]) -> Result<Workbook> {
    let cursor = Cursor::new(content.to_vec());

    let mut workbook =
        open_workbook_auto_from_rs(cursor).context("Unable to parse Excel content")?;

    let sheets = read_all_sheets(&mut workbook)?;
    Ok(Workbook::from_sheets(sheets))
}

/// Decode `content` and pull out the sheet called `sheet_name`.
///
/// An unknown sheet name is not an error: the workbook is still returned and
/// the sheet is `None`. No name matches no sheet.
pub fn extract(content: &[u8], sheet_name: Option<&str>) -> Result<(Workbook, Option<Sheet>)> {
    let workbook = open_workbook_from_bytes(content)?;

    let sheet = sheet_name.and_then(|name| workbook.sheet_by_name(name).cloned());

    if sheet.is_none() {
        debug!(
            "Sheet {:?} not found, available: {:?}",
            sheet_name,
            workbook.sheet_names()
        );
    }

    Ok((workbook, sheet))
}

fn read_all_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Vec<Sheet>> {
    let sheet_names = workbook.sheet_names();

    // Pre-allocate with the right capacity
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .with_context(|| format!("Unable to read worksheet: {}", name))?;

        let sheet = create_sheet_from_range(name, &range);
        debug!("Loaded sheet {:?} ({}x{})", name, sheet.nrows, sheet.ncols);
        sheets.push(sheet);
    }

    Ok(sheets)
}

fn create_sheet_from_range(name: &str, range: &Range<Data>) -> Sheet {
    // Ranges start at the first used cell; keep A1 at (0, 0)
    let (row_offset, col_offset) = match range.start() {
        Some((row, col)) => (row as usize, col as usize),
        None => return Sheet::new(name, 0, 0),
    };
    let (height, width) = range.get_size();

    let mut sheet = Sheet::new(name, row_offset + height, col_offset + width);

    // Process only non-empty cells
    for (row_idx, col_idx, data) in range.used_cells() {
        sheet.rows[row_offset + row_idx][col_offset + col_idx] = convert_cell(data);
    }

    sheet
}

fn convert_cell(data: &Data) -> Cell {
    let (value, cell_type, original_type) = match data {
        Data::Empty => return Cell::empty(),

        Data::String(s) => (s.clone(), CellType::Text, DataTypeInfo::String),

        Data::Float(f) => (format_number(*f), CellType::Number, DataTypeInfo::Float(*f)),

        Data::Int(i) => (format_number(*i as f64), CellType::Number, DataTypeInfo::Int(*i)),

        Data::Bool(b) => (
            if *b { "1" } else { "0" }.to_string(),
            CellType::Boolean,
            DataTypeInfo::Bool(*b),
        ),

        Data::Error(e) => (format!("Error: {:?}", e), CellType::Text, DataTypeInfo::Error),

        // Dates keep their serial number; exporters convert from `original_type`
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            (format_number(serial), CellType::Date, DataTypeInfo::DateTime(serial))
        }

        Data::DateTimeIso(s) => (
            s.clone(),
            CellType::Date,
            DataTypeInfo::DateTimeIso(s.clone()),
        ),

        Data::DurationIso(s) => (
            s.clone(),
            CellType::Text,
            DataTypeInfo::DurationIso(s.clone()),
        ),
    };

    Cell::new(value, cell_type, Some(original_type))
}

impl Workbook {
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_by_index(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;

use crate::excel::{Sheet, Workbook};
use crate::json_export::converters::process_cell_value;
use crate::json_export::types::OrderedSheetData;

pub fn serialize_to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize data to JSON")
}

/// Turn the body rows of `sheet` into objects keyed by the header row.
///
/// Columns with an empty header are skipped, as are rows with no values left.
pub fn sheet_to_records(sheet: &Sheet) -> OrderedSheetData {
    let Some(header) = sheet.header() else {
        return Vec::new();
    };

    let headers: Vec<(usize, &str)> = header
        .iter()
        .enumerate()
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(col_idx, cell)| (col_idx, cell.value.as_str()))
        .collect();

    let mut sheet_data = Vec::with_capacity(sheet.nrows.saturating_sub(1));

    // Process each data row
    for row in sheet.body_rows() {
        let mut row_data = IndexMap::with_capacity(headers.len());

        for (col_idx, name) in &headers {
            if let Some(cell) = row.get(*col_idx) {
                row_data.insert((*name).to_string(), process_cell_value(cell));
            }
        }

        if row_data.values().any(|v| !v.is_null()) {
            sheet_data.push(row_data);
        }
    }

    sheet_data
}

pub fn workbook_to_json(workbook: &Workbook) -> IndexMap<String, OrderedSheetData> {
    workbook
        .sheets()
        .iter()
        .map(|sheet| (sheet.name.clone(), sheet_to_records(sheet)))
        .collect()
}

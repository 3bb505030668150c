mod converters;
mod exporters;
mod types;

pub use converters::process_cell_value;
pub use exporters::{serialize_to_json, sheet_to_records, workbook_to_json};
pub use types::{OrderedRecord, OrderedSheetData};

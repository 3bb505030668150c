mod cell;
mod sheet;
mod workbook;

pub use cell::{Cell, CellType, DataTypeInfo, format_number};
pub use sheet::Sheet;
pub use workbook::{Workbook, extract, open_workbook, open_workbook_from_bytes};

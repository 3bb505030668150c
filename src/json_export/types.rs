use indexmap::IndexMap;
use serde_json::Value;

// One JSON object per body row, keys in header column order
pub type OrderedRecord = IndexMap<String, Value>;
pub type OrderedSheetData = Vec<OrderedRecord>;

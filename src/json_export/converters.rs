use serde_json::{Value, json};

use crate::excel::{Cell, CellType, DataTypeInfo};
use crate::utils::helpers::excel_date_to_iso_string;

fn float_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9e15 {
        json!(f.trunc() as i64)
    } else {
        json!(f)
    }
}

// Process cell value based on its type
pub fn process_cell_value(cell: &Cell) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }

    if let Some(original_type) = &cell.original_type {
        match original_type {
            DataTypeInfo::Float(f) => float_value(*f),
            DataTypeInfo::Int(i) => json!(i),
            DataTypeInfo::DateTime(dt) => match excel_date_to_iso_string(*dt) {
                Some(iso) => json!(iso),
                None => json!(cell.value),
            },
            DataTypeInfo::DateTimeIso(s) => json!(s),
            DataTypeInfo::Bool(b) => json!(b),
            DataTypeInfo::Empty => Value::Null,
            _ => json!(cell.value),
        }
    } else {
        match cell.cell_type {
            CellType::Number => match cell.value.parse::<f64>() {
                Ok(num) => float_value(num),
                Err(_) => json!(cell.value),
            },
            CellType::Boolean => match cell.value.to_lowercase().as_str() {
                "true" | "1" => json!(true),
                "false" | "0" => json!(false),
                _ => json!(cell.value),
            },
            CellType::Empty => Value::Null,
            _ => json!(cell.value), // Text, Date
        }
    }
}

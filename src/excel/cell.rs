#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: String,
    pub cell_type: CellType,
    pub original_type: Option<DataTypeInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellType {
    Text,
    Number,
    Date,
    Boolean,
    Empty,
}

// Typed value as decoded from the file, kept for exporters that need more than text
#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeInfo {
    Empty,
    String,
    Float(f64),
    Int(i64),
    Bool(bool),
    DateTime(f64),
    DateTimeIso(String),
    DurationIso(String),
    Error,
}

impl Cell {
    pub fn new(value: String, cell_type: CellType, original_type: Option<DataTypeInfo>) -> Self {
        Self {
            value,
            cell_type,
            original_type,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            return Self::empty();
        }
        Self::new(value, CellType::Text, Some(DataTypeInfo::String))
    }

    pub fn number(f: f64) -> Self {
        Self::new(format_number(f), CellType::Number, Some(DataTypeInfo::Float(f)))
    }

    pub fn empty() -> Self {
        Self {
            value: String::new(),
            cell_type: CellType::Empty,
            original_type: Some(DataTypeInfo::Empty),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cell_type == CellType::Empty || self.value.is_empty()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

// Floats always carry a fraction (`3.0`) or a signed exponent (`1e+16`)
pub fn format_number(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = f.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let s = format!("{:e}", f);
        let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{}e{}{:0>2}", mantissa, sign, digits);
    }

    let s = f.to_string();
    if s.contains('.') { s } else { format!("{}.0", s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3.0");
        assert_eq!(format_number(-12.0), "-12.0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(45292.0), "45292.0");
        assert_eq!(format_number(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_format_number_exponent() {
        assert_eq!(format_number(1e16), "1e+16");
        assert_eq!(format_number(1e300), "1e+300");
        assert_eq!(format_number(1.5e-5), "1.5e-05");
        assert_eq!(format_number(f64::NAN), "nan");
    }

    #[test]
    fn test_text_cell_empty_string_is_empty() {
        let cell = Cell::text("");
        assert!(cell.is_empty());
        assert_eq!(cell.cell_type, CellType::Empty);
    }

    #[test]
    fn test_number_cell() {
        let cell = Cell::number(42.0);
        assert_eq!(cell.value, "42.0");
        assert_eq!(cell.cell_type, CellType::Number);
        assert_eq!(cell.original_type, Some(DataTypeInfo::Float(42.0)));
    }
}

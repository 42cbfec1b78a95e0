use crate::ast::DataType;

/// An operand after resolution: a literal, or a variable's current value
/// read according to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(u64),
    Text(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Text(_) => DataType::Text,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Text(_) => "text",
        }
    }

    /// The textual form stored in the symbol table.
    pub fn into_stored(self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Text(s) => s,
        }
    }
}

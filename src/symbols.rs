use crate::ast::DataType;
use crate::lexer::MAX_INT_VALUE;
use crate::value::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub data_type: DataType,
    /// Integers are kept as decimal digit strings. Unassigned variables hold
    /// an empty value.
    pub value: String,
}

impl Variable {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            value: String::new(),
        }
    }

    /// Reads the stored text according to the declared type. An empty int
    /// reads as 0; anything else that is not a decimal in range is `None`.
    pub fn resolve(&self) -> Option<Value> {
        match self.data_type {
            DataType::Text => Some(Value::Text(self.value.clone())),
            DataType::Int if self.value.is_empty() => Some(Value::Int(0)),
            DataType::Int => {
                if !self.value.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                self.value
                    .parse::<u64>()
                    .ok()
                    .filter(|n| *n <= MAX_INT_VALUE)
                    .map(Value::Int)
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SymbolError {
    AlreadyDeclared,
    Undeclared,
}

/// Process-lifetime registry of declared variables. Entries are never
/// removed.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    variables: HashMap<String, Variable>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, data_type: DataType) -> Result<(), SymbolError> {
        if self.variables.contains_key(name) {
            return Err(SymbolError::AlreadyDeclared);
        }
        self.variables
            .insert(name.to_string(), Variable::new(name, data_type));
        Ok(())
    }

    /// Declaration as re-executed by a replayed loop body: an existing entry
    /// is reset instead of rejected.
    pub fn redeclare(&mut self, name: &str, data_type: DataType) {
        self.variables
            .insert(name.to_string(), Variable::new(name, data_type));
    }

    pub fn lookup(&self, name: &str) -> Result<&Variable, SymbolError> {
        self.variables.get(name).ok_or(SymbolError::Undeclared)
    }

    pub fn set_value(&mut self, name: &str, value: String) -> Result<(), SymbolError> {
        let variable = self.variables.get_mut(name).ok_or(SymbolError::Undeclared)?;
        variable.value = value;
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

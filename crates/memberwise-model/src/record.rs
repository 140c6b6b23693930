//! Record-like owners whose members are described by a schema.
//!
//! [`Record`] is a key/value map and [`Row`] a positional tabular record.
//! Their schemas ([`RecordSchema`], [`RowSchema`]) declare typed columns and
//! act as [`MemberProvider`]s yielding [`MemberKind::Accessor`](crate::MemberKind::Accessor)
//! members, so records map to and from structs like any other owner.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bridge::MemberValue;
use crate::error::{ModelError, Result};
use crate::member::{Getter, Member, Setter, Slot};
use crate::provider::MemberProvider;
use crate::types::ValueType;
use crate::value::Value;

/// A declared, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub value_type: ValueType,
}

impl Column {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// Key/value map owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a typed value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl MemberValue) -> Self {
        self.values.insert(key.into(), value.into_value());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// Column declarations for [`Record`] owners.
///
/// An absent key reads as the column type's default; present values must
/// conform to the declared type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: String,
    columns: Vec<Column>,
}

impl RecordSchema {
    /// `name` labels the owner in diagnostics.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.columns.push(Column::new(name, value_type));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl MemberProvider<Record> for RecordSchema {
    fn members(&self) -> Vec<Member<Record>> {
        self.columns
            .iter()
            .map(|column| {
                let key = column.name.clone();
                let value_type = column.value_type.clone();
                let get: Getter<Record> = Arc::new(move |record: &Record| {
                    checked_read(record.get(&key), &value_type)
                });

                let key = column.name.clone();
                let value_type = column.value_type.clone();
                let set: Setter<Record> = Arc::new(move |record: &mut Record, value: Value| {
                    ensure_conforms(&value, &value_type)?;
                    record.set(key.clone(), value);
                    Ok(())
                });

                Member::accessor(&column.name, column.value_type.clone(), Some(get), Some(set))
                    .with_owner(self.name.clone())
                    .with_slot(Slot::Key(column.name.clone()))
            })
            .collect()
    }
}

/// Positional tabular record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<Value>,
}

impl Row {
    pub fn new(cells: Vec<Value>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.cells.get(index)
    }

    /// Sets the cell at `index`, padding with nulls when the row is short.
    pub fn set(&mut self, index: usize, value: Value) {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, Value::Null);
        }
        self.cells[index] = value;
    }
}

/// Column declarations for [`Row`] owners; column order is cell order.
#[derive(Debug, Clone)]
pub struct RowSchema {
    name: String,
    columns: Vec<Column>,
}

impl RowSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.columns.push(Column::new(name, value_type));
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// A row holding the default value of every column.
    pub fn empty_row(&self) -> Row {
        Row::new(
            self.columns
                .iter()
                .map(|column| column.value_type.default_value())
                .collect(),
        )
    }

    /// Builds a row from cells, checking each against its column.
    ///
    /// # Errors
    ///
    /// [`ModelError::CellCount`] unless there is one cell per column, then
    /// [`ModelError::TypeMismatch`] for the first non-conforming cell.
    pub fn row(&self, cells: Vec<Value>) -> Result<Row> {
        if cells.len() != self.columns.len() {
            return Err(ModelError::CellCount {
                row: self.name.clone(),
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        for (column, cell) in self.columns.iter().zip(&cells) {
            ensure_conforms(cell, &column.value_type)?;
        }
        Ok(Row::new(cells))
    }
}

impl MemberProvider<Row> for RowSchema {
    fn members(&self) -> Vec<Member<Row>> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let value_type = column.value_type.clone();
                let get: Getter<Row> =
                    Arc::new(move |row: &Row| checked_read(row.get(index), &value_type));

                let value_type = column.value_type.clone();
                let set: Setter<Row> = Arc::new(move |row: &mut Row, value: Value| {
                    ensure_conforms(&value, &value_type)?;
                    row.set(index, value);
                    Ok(())
                });

                Member::accessor(&column.name, column.value_type.clone(), Some(get), Some(set))
                    .with_owner(self.name.clone())
                    .with_slot(Slot::Index(index))
            })
            .collect()
    }
}

fn checked_read(value: Option<&Value>, value_type: &ValueType) -> Result<Value> {
    match value {
        None => Ok(value_type.default_value()),
        Some(value) => {
            ensure_conforms(value, value_type)?;
            Ok(value.clone())
        }
    }
}

fn ensure_conforms(value: &Value, value_type: &ValueType) -> Result<()> {
    if value.conforms_to(value_type) {
        Ok(())
    } else {
        Err(ModelError::type_mismatch(value_type.clone(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> RecordSchema {
        RecordSchema::new("Customer")
            .column("Id", ValueType::I32)
            .column("Nickname", ValueType::nullable(ValueType::String))
    }

    #[test]
    fn test_record_members_read_and_write() {
        let members = schema().members();
        let mut record = Record::new().with("Id", 3_i32);

        assert_eq!(members[0].read(&record).unwrap(), Value::I32(3));
        assert_eq!(members[1].read(&record).unwrap(), Value::Null);

        members[1]
            .write(&mut record, Value::Str("Ace".to_string()))
            .unwrap();
        assert_eq!(record.get("Nickname"), Some(&Value::Str("Ace".to_string())));
        assert_eq!(members[0].owner(), "Customer");
    }

    #[test]
    fn test_record_rejects_mistyped_values() {
        let members = schema().members();
        let record = Record::new().with("Id", "three".to_string());
        assert!(matches!(
            members[0].read(&record),
            Err(ModelError::TypeMismatch { .. })
        ));

        let mut record = Record::new();
        assert!(members[0].write(&mut record, Value::I64(1)).is_err());
        assert!(record.is_empty());
    }

    #[test]
    fn test_absent_key_reads_default() {
        let members = schema().members();
        assert_eq!(members[0].read(&Record::new()).unwrap(), Value::I32(0));
    }

    #[test]
    fn test_row_members_are_positional() {
        let schema = RowSchema::new("Line")
            .column("Sku", ValueType::String)
            .column("Qty", ValueType::U32);
        let members = schema.members();
        let mut row = schema
            .row(vec![Value::Str("A-1".to_string()), Value::U32(2)])
            .unwrap();

        assert_eq!(members[1].read(&row).unwrap(), Value::U32(2));
        members[1].write(&mut row, Value::U32(9)).unwrap();
        assert_eq!(row.cells()[1], Value::U32(9));
        assert_eq!(schema.empty_row().cells(), &[Value::Str(String::new()), Value::U32(0)]);
    }

    #[test]
    fn test_row_requires_one_cell_per_column() {
        let schema = RowSchema::new("Line")
            .column("Sku", ValueType::String)
            .column("Qty", ValueType::U32);
        let short = schema.row(vec![Value::Str("A-1".to_string())]).unwrap_err();
        assert_eq!(short.to_string(), "row Line declares 2 columns, got 1 cells");

        let long = schema.row(vec![
            Value::Str("A-1".to_string()),
            Value::U32(2),
            Value::Bool(true),
        ]);
        assert!(matches!(
            long,
            Err(ModelError::CellCount {
                expected: 2,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_row_members_use_positional_slots() {
        let forward = RowSchema::new("Name")
            .column("First", ValueType::String)
            .column("Last", ValueType::String)
            .members();
        let reversed = RowSchema::new("Name")
            .column("Last", ValueType::String)
            .column("First", ValueType::String)
            .members();
        assert_eq!(forward[0].slot(), &Slot::Index(0));
        assert_ne!(forward[0], reversed[1]);
        let other = RowSchema::new("Other")
            .column("First", ValueType::String)
            .members();
        assert_eq!(forward[0], other[0]);
    }

    #[test]
    fn test_row_pads_short_rows_on_write() {
        let mut row = Row::default();
        row.set(2, Value::Bool(true));
        assert_eq!(row.cells(), &[Value::Null, Value::Null, Value::Bool(true)]);
    }
}

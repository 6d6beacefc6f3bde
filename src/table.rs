//! Day-indexed tables with named columns.
//!
//! Output tables are handed to a presentation layer that addresses columns by name (`day`,
//! `hosp`, `icu`, `vent`, compartment names, ...), so the typed row structs convert into a
//! [`Table`] that keeps column names, column order and the column's value type.
use chrono::NaiveDate;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Date(Vec<NaiveDate>),
    Text(Vec<String>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Integer(values) => values.len(),
            Column::Float(values) => values.len(),
            Column::Date(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A short name for the column's value type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Integer(_) => "integer",
            Column::Float(_) => "float",
            Column::Date(_) => "date",
            Column::Text(_) => "text",
        }
    }

    /// The value in `row` formatted for a text report. Dates use ISO 8601.
    #[must_use]
    pub fn cell(&self, row: usize) -> Option<String> {
        match self {
            Column::Integer(values) => values.get(row).map(ToString::to_string),
            Column::Float(values) => values.get(row).map(ToString::to_string),
            Column::Date(values) => values.get(row).map(|d| d.format("%Y-%m-%d").to_string()),
            Column::Text(values) => values.get(row).cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: IndexMap<String, Column>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Table::default()
    }

    /// Appends a column, or replaces the column of the same name in place.
    pub fn push_column(&mut self, name: &str, column: Column) {
        self.columns.insert(name.to_string(), column);
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Removes a column, keeping the order of the rest.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        self.columns.shift_remove(name)
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, column)| (name.as_str(), column))
    }

    /// The length of the longest column.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.values().map(Column::len).max().unwrap_or(0)
    }

    /// Each row as formatted cells, in column order. Short columns yield empty cells.
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        (0..self.row_count()).map(move |row| {
            self.columns
                .values()
                .map(|column| column.cell(row).unwrap_or_default())
                .collect()
        })
    }
}

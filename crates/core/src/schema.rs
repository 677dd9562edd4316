//! Static catalog of the tables the SQL engine may query.
//!
//! A [`SchemaDescriptor`] is built once at startup and shared read-only by
//! every session. It is serialized into the SQL-generation prompt and drives
//! the template set.

use serde::{Deserialize, Serialize};

/// Semantic type of a column, coarser than the SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Identifier,
    Numeric,
    Categorical,
    Date,
    Timestamp,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub semantic: SemanticType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Operator phrases that name this column, e.g. "tap temperature".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, semantic: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic,
            unit: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.semantic == SemanticType::Numeric
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub description: String,
    /// Operator nouns that identify this table, e.g. "heats".
    pub nouns: Vec<String>,
    /// Column used for "recent"/"latest" ordering and date filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_column: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A column pair two tables can be joined on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinKey {
    pub left_table: String,
    pub left_column: String,
    pub right_table: String,
    pub right_column: String,
}

impl JoinKey {
    pub fn new(left: (&str, &str), right: (&str, &str)) -> Self {
        Self {
            left_table: left.0.into(),
            left_column: left.1.into(),
            right_table: right.0.into(),
            right_column: right.1.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub tables: Vec<TableDescriptor>,
    pub joins: Vec<JoinKey>,
}

impl SchemaDescriptor {
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Compact text form for model prompts, one table per block.
    ///
    /// ```text
    /// melting_heat_records: Furnace melt log, one row per heat
    ///   heat_number (identifier), tap_temperature_c (numeric, °C), ...
    /// joins: melting_heat_records.heat_number = casting_records.heat_number
    /// ```
    pub fn render_for_prompt(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&format!("{}: {}\n  ", table.name, table.description));
            let cols: Vec<String> = table
                .columns
                .iter()
                .map(|c| {
                    let semantic = serde_json::to_value(c.semantic)
                        .ok()
                        .and_then(|v| v.as_str().map(str::to_string))
                        .unwrap_or_default();
                    match &c.unit {
                        Some(unit) => format!("{} ({semantic}, {unit})", c.name),
                        None => format!("{} ({semantic})", c.name),
                    }
                })
                .collect();
            out.push_str(&cols.join(", "));
            out.push('\n');
        }
        if !self.joins.is_empty() {
            out.push_str("joins:\n");
            for j in &self.joins {
                out.push_str(&format!(
                    "  {}.{} = {}.{}\n",
                    j.left_table, j.left_column, j.right_table, j.right_column
                ));
            }
        }
        out
    }
}

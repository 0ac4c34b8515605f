use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::config::SourceConfig;
use crate::constants::{EXPORT_DATA_STREAM_PREFIX, JSON_SCHEMA_DRAFT};
use crate::error::{Result, SourceError};
use crate::payload::ExportDataCall;
use crate::response::ApiResponse;
use crate::types::{AdaptiveStream, RecordData};

/// Lower-case a column header and replace its whitespace with underscores.
pub fn field_name(header: &str) -> String {
    header
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Where each output field sits in a CSV row: three fixed leading columns,
/// the requested dimensions in order, then the amount.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingOrder {
    columns: Vec<(String, usize)>,
}

impl MappingOrder {
    pub fn for_dimensions(dimensions: &[String]) -> Self {
        let mut mapping = Self {
            columns: vec![
                ("account_name".to_string(), 0),
                ("account_code".to_string(), 1),
                ("level_name".to_string(), 2),
            ],
        };

        let leading = mapping.columns.len();
        for (n, dimension) in dimensions.iter().enumerate() {
            mapping.set(field_name(dimension), n + leading);
        }

        // Amount is the column after the last mapped one
        let amount = mapping.columns.len();
        mapping.set("amount".to_string(), amount);
        mapping
    }

    // A repeated name keeps its place and takes the new index
    fn set(&mut self, name: String, index: usize) {
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = index,
            None => self.columns.push((name, index)),
        }
    }

    pub fn columns(&self) -> &[(String, usize)] {
        &self.columns
    }

    /// Project a CSV row into record data keyed by field name.
    pub fn project(&self, row: &[String]) -> Result<RecordData> {
        let mut data = RecordData::new();
        for (name, index) in &self.columns {
            let value = row.get(*index).ok_or_else(|| {
                SourceError::Reshape(format!(
                    "row has {} fields, '{}' expects column {}",
                    row.len(),
                    name,
                    index
                ))
            })?;
            data.insert(name.clone(), Value::String(value.clone()));
        }
        Ok(data)
    }
}

/// Flat per-row export for a single period.
pub struct ExportDataStream {
    config: SourceConfig,
    mapping: MappingOrder,
}

impl ExportDataStream {
    pub fn new(config: SourceConfig) -> Self {
        let mapping = MappingOrder::for_dimensions(&config.method_obj.dimensions);
        Self { config, mapping }
    }

    pub fn mapping(&self) -> &MappingOrder {
        &self.mapping
    }
}

impl AdaptiveStream for ExportDataStream {
    fn construct_payload(&self) -> Result<String> {
        ExportDataCall::single_period(&self.config).to_xml()
    }

    fn generate_table_name(&self) -> String {
        format!("{}_{}", EXPORT_DATA_STREAM_PREFIX, self.config.method_obj.version)
    }

    fn generate_table_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        for name in ["account_name", "account_code", "level_name"] {
            properties.insert(name.to_string(), json!({"type": "string"}));
        }
        for dimension in &self.config.method_obj.dimensions {
            properties.insert(field_name(dimension), json!({"type": "string"}));
        }
        properties.insert("date".to_string(), json!({"type": "string"}));
        properties.insert("amount".to_string(), json!({"type": "number"}));

        json!({
            "$schema": JSON_SCHEMA_DRAFT,
            "type": "object",
            "properties": properties,
        })
    }

    #[instrument(skip(self, response, emit), fields(stream = %self.generate_table_name()))]
    fn generate_table_rows(
        &self,
        response: &ApiResponse,
        emit: &mut dyn FnMut(RecordData) -> Result<()>,
    ) -> Result<usize> {
        let table = response.csv_table()?;
        let date_selected = &self.config.method_obj.date_selected;

        let mut produced = 0usize;
        for row in &table.rows {
            let mut data = self.mapping.project(row)?;
            data.insert("date".to_string(), Value::String(date_selected.clone()));
            emit(data)?;
            produced += 1;
        }
        info!("Produced {} records for {}", produced, date_selected);
        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn field_names_are_snake_cased() {
        assert_eq!(field_name("Cost Center"), "cost_center");
        assert_eq!(field_name("GL\tAccount  Name"), "gl_account__name");
        assert_eq!(field_name("Region"), "region");
    }

    #[test]
    fn mapping_places_dimensions_between_fixed_columns_and_amount() {
        let mapping = MappingOrder::for_dimensions(&dims(&["Cost Center", "Region"]));
        let expected: Vec<(String, usize)> = vec![
            ("account_name".into(), 0),
            ("account_code".into(), 1),
            ("level_name".into(), 2),
            ("cost_center".into(), 3),
            ("region".into(), 4),
            ("amount".into(), 5),
        ];
        assert_eq!(mapping.columns(), expected.as_slice());
    }

    #[test]
    fn mapping_without_dimensions_puts_amount_fourth() {
        let mapping = MappingOrder::for_dimensions(&[]);
        assert_eq!(mapping.columns().last(), Some(&("amount".to_string(), 3)));
    }

    #[test]
    fn repeated_dimension_name_keeps_first_position() {
        let mapping = MappingOrder::for_dimensions(&dims(&["Region", "region"]));
        let names: Vec<&str> = mapping.columns().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["account_name", "account_code", "level_name", "region", "amount"]);
        assert_eq!(mapping.columns()[3].1, 4);
        assert_eq!(mapping.columns()[4].1, 4);
    }

    #[test]
    fn short_row_is_an_error() {
        let mapping = MappingOrder::for_dimensions(&dims(&["Cost Center"]));
        let row = dims(&["AcctName", "AcctCode", "L1"]);
        assert!(matches!(mapping.project(&row), Err(SourceError::Reshape(_))));
    }
}

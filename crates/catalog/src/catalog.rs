//! The occupancy tool catalog.

use serde_json::Value;

use crate::schema::{Field, FieldType, ToolSchema};
use crate::{Error, Result};

/// Tool that turns a raw flow CSV into an occupancy CSV.
pub const PREPROCESS_TOOL: &str = "preprocess_occupancy_data";

/// Immutable set of tools available to the assistant.
///
/// Built once at startup and shared read-only between turns.
#[derive(Debug, Clone)]
pub struct Catalog {
    tools: Vec<ToolSchema>,
}

impl Catalog {
    /// Create a catalog from explicit schemas.
    pub fn new(tools: Vec<ToolSchema>) -> Self {
        Self { tools }
    }

    /// The five tools exposed by the occupancy executor.
    pub fn occupancy() -> Self {
        Self::new(vec![
            ToolSchema {
                name: "get_current_occupancy",
                description: "Returns current occupancy count based on gesture events from Arduino.",
                fields: Vec::new(),
                upload_argument: None,
            },
            ToolSchema {
                name: "reset_current_occupancy",
                description: "Resets the gesture-based occupancy counters to zero.",
                fields: Vec::new(),
                upload_argument: None,
            },
            ToolSchema {
                name: "get_serial_status",
                description: "Returns current serial configuration and any connection error.",
                fields: Vec::new(),
                upload_argument: None,
            },
            ToolSchema {
                name: "get_building_statistics",
                description: "Queries occupancy data for a specific building and date/time window.",
                fields: vec![
                    Field::optional("building", FieldType::NullableString),
                    Field::required("date", FieldType::String)
                        .describe("MM/DD/YY e.g. 07/24/05"),
                    Field::optional("start_time", FieldType::NullableString)
                        .describe("HH:MM:SS"),
                    Field::optional("end_time", FieldType::NullableString)
                        .describe("HH:MM:SS"),
                    Field::optional("file_path", FieldType::NullableString)
                        .describe("Optional preprocessed CSV file path on server"),
                ],
                upload_argument: None,
            },
            ToolSchema {
                name: PREPROCESS_TOOL,
                description: "Preprocess raw flow data via Arduino and save occupancy CSV in results folder.",
                fields: vec![
                    Field::required("input_path", FieldType::String)
                        .describe("Path to raw flow CSV on server filesystem"),
                ],
                upload_argument: Some("input_path"),
            },
        ])
    }

    /// All tools, in declaration order.
    pub fn tools(&self) -> &[ToolSchema] {
        &self.tools
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolSchema> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Check that `name` exists and `arguments` match its declared fields.
    pub fn validate(&self, name: &str, arguments: &Value) -> Result<()> {
        self.get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?
            .validate(arguments)
    }

    /// Argument of `name` that receives an uploaded file path, if any.
    pub fn upload_argument(&self, name: &str) -> Option<&'static str> {
        self.get(name).and_then(|t| t.upload_argument)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::occupancy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn occupancy_catalog_has_five_tools() {
        let catalog = Catalog::occupancy();
        let names: Vec<_> = catalog.tools().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            [
                "get_current_occupancy",
                "reset_current_occupancy",
                "get_serial_status",
                "get_building_statistics",
                "preprocess_occupancy_data",
            ]
        );
    }

    #[test]
    fn only_preprocess_takes_uploads() {
        let catalog = Catalog::occupancy();
        assert_eq!(catalog.upload_argument(PREPROCESS_TOOL), Some("input_path"));
        assert_eq!(catalog.upload_argument("get_building_statistics"), None);
        assert_eq!(catalog.upload_argument("missing"), None);
    }

    #[test]
    fn validate_unknown_tool() {
        let err = Catalog::occupancy()
            .validate("drop_tables", &json!({}))
            .unwrap_err();
        assert_eq!(err, Error::UnknownTool("drop_tables".into()));
    }

    #[test]
    fn validate_statistics_arguments() {
        let catalog = Catalog::occupancy();
        assert!(
            catalog
                .validate(
                    "get_building_statistics",
                    &json!({"date": "07/24/05", "building": null, "end_time": "18:00:00"})
                )
                .is_ok()
        );
        assert!(
            catalog
                .validate("get_building_statistics", &json!({"building": "Hall"}))
                .is_err()
        );
    }

    #[test]
    fn no_argument_tools_accept_null_input() {
        let catalog = Catalog::occupancy();
        assert!(catalog.validate("get_current_occupancy", &Value::Null).is_ok());
        assert!(
            catalog
                .validate("get_current_occupancy", &json!({"verbose": true}))
                .is_err()
        );
    }
}

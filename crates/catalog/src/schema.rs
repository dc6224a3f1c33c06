use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{Error, Result};

/// Primitive types a tool argument may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    /// A string that may also be sent as an explicit `null`.
    NullableString,
}

impl FieldType {
    fn json_type(self) -> Value {
        match self {
            Self::String => json!("string"),
            Self::NullableString => json!(["string", "null"]),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::NullableString => "a string or null",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::String(_)) => true,
            (Self::NullableString, Value::Null) => true,
            _ => false,
        }
    }
}

/// A single declared argument.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl Field {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            description: None,
        }
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            description: None,
        }
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// Declared contract of one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: Vec<Field>,
    /// Argument that receives the path of a file uploaded with the request.
    #[serde(skip)]
    pub upload_argument: Option<&'static str>,
}

impl ToolSchema {
    /// Render the declared fields as a JSON Schema object.
    ///
    /// Unknown fields are always forbidden.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".into(), field.ty.json_type());
            if let Some(description) = field.description {
                prop.insert("description".into(), json!(description));
            }
            properties.insert(field.name.into(), Value::Object(prop));
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema.insert("additionalProperties".into(), json!(false));

        Value::Object(schema)
    }

    /// Check arguments against the declared fields.
    ///
    /// `null` for an absent tool input is treated as an empty object.
    pub fn validate(&self, arguments: &Value) -> Result<()> {
        let empty = Map::new();
        let args = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(Error::NotAnObject {
                    tool: self.name.to_string(),
                    found: type_name(other),
                });
            }
        };

        if let Some(unknown) = args
            .keys()
            .find(|key| !self.fields.iter().any(|f| f.name == key.as_str()))
        {
            return Err(Error::UnknownField {
                tool: self.name.to_string(),
                field: unknown.clone(),
            });
        }

        for field in &self.fields {
            match args.get(field.name) {
                None if field.required => {
                    return Err(Error::MissingField {
                        tool: self.name.to_string(),
                        field: field.name.to_string(),
                    });
                }
                None => {}
                Some(value) if !field.ty.accepts(value) => {
                    return Err(Error::WrongType {
                        tool: self.name.to_string(),
                        field: field.name.to_string(),
                        expected: field.ty.expected(),
                        found: type_name(value),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

use std::collections::HashMap;

/// A single measurement field: an unsigned total or the current state name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    UInteger(u64),
    Text(String),
}

impl serde::Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            FieldValue::UInteger(value) => serializer.serialize_u64(*value),
            FieldValue::Text(value) => serializer.serialize_str(value),
        }
    }
}

/// One recorded data point: a named measurement with its fields and tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub name: String,
    pub fields: HashMap<String, FieldValue>,
    pub tags: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_values_serialize_as_bare_json_values() {
        assert_eq!(
            serde_json::to_string(&FieldValue::UInteger(12)).unwrap(),
            "12"
        );
        assert_eq!(
            serde_json::to_string(&FieldValue::Text("active".to_owned())).unwrap(),
            "\"active\""
        );
    }
}

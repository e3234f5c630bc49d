use serde_json::{json, Value};

/// Structured-output schema for [`super::Blueprint`], in the API's OpenAPI subset.
pub fn blueprint_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "hook": { "type": "STRING" },
            "deepDive": { "type": "STRING" },
            "script": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "timestamp": { "type": "STRING" },
                        "talk": { "type": "STRING" },
                        "visual": { "type": "STRING" }
                    },
                    "required": ["timestamp", "talk", "visual"]
                }
            },
            "visualizationIdea": { "type": "STRING" },
            "codeSample": { "type": "STRING" },
            "audioAtmosphere": {
                "type": "OBJECT",
                "properties": {
                    "intro": { "type": "STRING" },
                    "background": { "type": "STRING" },
                    "sfx": { "type": "STRING" },
                    "outro": { "type": "STRING" }
                },
                "required": ["intro", "background", "sfx", "outro"]
            },
            "seo": {
                "type": "OBJECT",
                "properties": {
                    "description": { "type": "STRING" },
                    "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["description", "tags"]
            }
        },
        "required": [
            "title",
            "hook",
            "deepDive",
            "script",
            "visualizationIdea",
            "codeSample",
            "audioAtmosphere",
            "seo"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_are_declared_properties() {
        let schema = blueprint_schema();
        let properties = schema["properties"].as_object().unwrap();
        for field in schema["required"].as_array().unwrap() {
            let name = field.as_str().unwrap();
            assert!(properties.contains_key(name), "{} missing from properties", name);
        }
    }
}

use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// Output a message in the appropriate format. In JSON mode the fields of
/// `data` are merged next to `message`.
pub fn output_message(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&merge_message(message, data))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

fn merge_message(message: &str, data: Option<Value>) -> Value {
    let mut response = match data {
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
        None => Map::new(),
    };
    response.insert("message".to_string(), json!(message));
    Value::Object(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_object_fields_with_message() {
        let value = merge_message("ok", Some(json!({ "autorizado": true })));
        assert_eq!(value, json!({ "autorizado": true, "message": "ok" }));
    }

    #[test]
    fn wraps_non_objects() {
        let value = merge_message("ok", Some(json!([1, 2])));
        assert_eq!(value, json!({ "data": [1, 2], "message": "ok" }));
        assert_eq!(merge_message("ok", None), json!({ "message": "ok" }));
    }
}

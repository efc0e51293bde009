use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format. In JSON mode the
/// fields of `data` are merged next to `success` and `message`.
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".to_string(), json!(true));
            response.insert("message".to_string(), json!(message));

            if let Some(Value::Object(fields)) = data {
                response.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

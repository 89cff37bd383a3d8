use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format. `data` is merged into
/// the JSON object, or printed as `key: value` lines in text mode.
pub fn output_success(output_format: OutputFormat, message: &str, data: Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let (Some(target), Value::Object(fields)) = (response.as_object_mut(), data) {
                target.extend(fields);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Value::Object(fields) = data {
                for (key, value) in fields {
                    match value {
                        Value::String(s) => println!("  {}: {}", key, s),
                        other => println!("  {}: {}", key, other),
                    }
                }
            }
        }
    }
    Ok(())
}

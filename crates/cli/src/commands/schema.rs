//! `hitp schema`

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, SchemaField};
use crate::output::{format_number, print_warning, OutputFormat};

/// Row for the schema table
#[derive(Tabled)]
struct SchemaRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Field")]
    name: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Input")]
    widget: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Default")]
    default: String,
}

fn to_rows(fields: &[SchemaField]) -> Vec<SchemaRow> {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| SchemaRow {
            position: i + 1,
            name: f.name.clone(),
            label: f.label.clone(),
            widget: format!("{} ({})", f.widget, f.kind),
            range: format!("{} .. {}", format_number(f.min), format_number(f.max)),
            default: format_number(f.default),
        })
        .collect()
}

pub async fn show_schema(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let fields: Vec<SchemaField> = client.get("api/v1/schema").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        OutputFormat::Table => {
            if fields.is_empty() {
                print_warning("Server reported no input fields");
                return Ok(());
            }

            let table = tabled::Table::new(to_rows(&fields))
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_keep_server_order() {
        let fields = vec![
            SchemaField {
                name: "loudness".to_string(),
                label: "Loudness (dB)".to_string(),
                kind: "float".to_string(),
                widget: "number".to_string(),
                min: -60.0,
                max: 5.0,
                step: 0.1,
                default: -5.5,
            },
            SchemaField {
                name: "sections".to_string(),
                label: "Sections".to_string(),
                kind: "integer".to_string(),
                widget: "choice".to_string(),
                min: 1.0,
                max: 50.0,
                step: 1.0,
                default: 10.0,
            },
        ];

        let rows = to_rows(&fields);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].range, "-60 .. 5");
        assert_eq!(rows[0].default, "-5.5");
        assert_eq!(rows[1].widget, "choice (integer)");
        assert_eq!(rows[1].range, "1 .. 50");
    }
}

//! `hitp model`

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, ModelStatus};
use crate::output::{color_state, format_bytes, print_warning, OutputFormat};

#[derive(Tabled)]
struct PropertyRow {
    #[tabled(rename = "Property")]
    property: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn to_rows(status: &ModelStatus) -> Vec<PropertyRow> {
    let mut rows = vec![
        PropertyRow {
            property: "State",
            value: color_state(&status.state),
        },
        PropertyRow {
            property: "Path",
            value: status.path.clone(),
        },
    ];

    if let Some(artifact) = &status.artifact {
        rows.push(PropertyRow {
            property: "Format",
            value: artifact.format.clone(),
        });
        rows.push(PropertyRow {
            property: "Size",
            value: format_bytes(artifact.size_bytes),
        });
        rows.push(PropertyRow {
            property: "SHA-256",
            value: artifact.sha256.clone(),
        });
    }
    if let Some(loaded_at) = &status.loaded_at {
        rows.push(PropertyRow {
            property: "Loaded at",
            value: loaded_at.clone(),
        });
    }

    rows
}

pub async fn show_model(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let status: ModelStatus = client.get("api/v1/model").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Table => {
            let table = tabled::Table::new(to_rows(&status))
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            if let Some(error) = &status.error {
                print_warning(&format!("Predictions are disabled: {}", error));
            }
        }
    }

    Ok(())
}

use anyhow::{Context, Result, bail};
use sentilytics_core::dataset::Dataset;
use std::path::Path;

use super::Output;
use crate::bootstrap::App;

pub async fn upload(app: &App, output: &Output, path: &Path) -> Result<()> {
    require_session(app)?;
    let dataset = app
        .store
        .upload_file(path)
        .await
        .with_context(|| format!("Upload of {} failed", path.display()))?;

    output.emit(&dataset, || {
        println!(
            "Uploaded {} as {} ({} rows)",
            dataset.name, dataset.id, dataset.row_count
        )
    })
}

pub async fn list(app: &App, output: &Output) -> Result<()> {
    require_session(app)?;
    let datasets = app.store.load_dashboard_data().await?;

    output.emit(&datasets, || {
        if datasets.is_empty() {
            println!("No datasets uploaded yet");
            return;
        }
        for dataset in &datasets {
            println!(
                "{}  {}  {:>6} rows  {}",
                dataset.id,
                dataset.upload_date.format("%Y-%m-%d %H:%M"),
                dataset.row_count,
                dataset.name
            );
        }
    })
}

pub async fn show(app: &App, output: &Output, id: &str) -> Result<()> {
    require_session(app)?;
    let Some(dataset) = app.store.get_dataset(id).await? else {
        bail!("Dataset {id} not found");
    };

    if output.is_json() {
        // The raw content can be large; the preview is what callers want here
        let summary = serde_json::json!({
            "id": dataset.id,
            "name": dataset.name,
            "uploadDate": dataset.upload_date,
            "rowCount": dataset.row_count,
            "preview": dataset.preview,
        });
        return output.emit(&summary, || {});
    }

    print_preview(&dataset);
    Ok(())
}

fn print_preview(dataset: &Dataset) {
    println!("{} ({} rows)", dataset.name, dataset.row_count);
    println!("id:       {}", dataset.id);
    println!("uploaded: {}", dataset.upload_date.to_rfc3339());
    println!();
    for row in &dataset.preview {
        println!("  {}", row.join(" | "));
    }
    if dataset.row_count > dataset.preview.len() {
        println!("  ... {} more rows", dataset.row_count - dataset.preview.len());
    }
}

pub(super) fn require_session(app: &App) -> Result<()> {
    if !app.store.is_authenticated() {
        bail!("Not signed in. Run `sentilytics login` first.");
    }
    Ok(())
}

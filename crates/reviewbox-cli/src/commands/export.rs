use std::path::{Path, PathBuf};

use chrono::Utc;
use reviewbox_core::{render_reviews_export, suggested_export_file_name};

use crate::cli::ExportFormat;
use crate::commands::common::{load_config, open_service};
use crate::error::CliError;

pub async fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    db_path: &Path,
    config_path: &Path,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let reviews = open_service(db_path, &config)?.list().await;
    let rendered = render_reviews_export(&reviews, format.into())?;

    if let Some(path) = output_path {
        let path = resolve_export_path(path, format, Utc::now().timestamp_millis());
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// A directory target gets a generated file name inside it.
pub fn resolve_export_path(path: &Path, format: ExportFormat, timestamp_ms: i64) -> PathBuf {
    if path.is_dir() {
        path.join(suggested_export_file_name(format.into(), timestamp_ms))
    } else {
        path.to_path_buf()
    }
}

// quadlin_cli/src/data.rs

use crate::error::{AppError, Result};
use figment::{
    providers::{Format, Json, Toml},
    Figment,
};
use quadlin_core::estimation::{ThrustStandData, ThrustStandRecord};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataFormat {
    Toml,
    Json,
}

fn format_of(path: &Path) -> Result<DataFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(DataFormat::Toml),
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(DataFormat::Json),
        _ => Err(AppError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Reads a `{ thrusts, grams }` recording and validates it as rectangular.
pub fn load_thrust_stand(path: &Path) -> Result<ThrustStandData> {
    let format = format_of(path)?;
    if !path.is_file() {
        return Err(AppError::MissingFile(path.to_path_buf()));
    }

    let figment = match format {
        DataFormat::Toml => Figment::from(Toml::file(path)),
        DataFormat::Json => Figment::from(Json::file(path)),
    };
    let record: ThrustStandRecord = figment.extract()?;
    let data = ThrustStandData::try_from(record)?;

    info!(
        "Loaded {} command levels x {} trials from {}",
        data.len(),
        data.trials(),
        path.display()
    );
    Ok(data)
}

/// Writes a recording as TOML.
pub fn save_thrust_stand(path: &Path, data: &ThrustStandData) -> Result<()> {
    if format_of(path)? != DataFormat::Toml {
        return Err(AppError::UnsupportedFormat(path.to_path_buf()));
    }
    let text = toml::to_string_pretty(&ThrustStandRecord::from(data))?;
    fs::write(path, text)?;
    Ok(())
}

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::models::LotteryData;

/// Format des dates dans les documents des scrapers.
pub const DRAW_DATE_FORMAT: &str = "%d-%m-%Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn data_dir() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("json_Datos");
    path
}

pub fn data_path() -> PathBuf {
    let mut path = data_dir();
    path.push("lottery_data.json");
    path
}

pub fn load_lottery(path: &Path) -> Result<LotteryData> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let data = parse_lottery(&json)
        .with_context(|| format!("JSON invalide dans {:?}", path))?;
    log::info!(
        "{} chargée : {} numéros, {} positions",
        data.lottery_name,
        data.numbers.len(),
        data.positions_count
    );
    Ok(data)
}

pub fn parse_lottery(json: &str) -> Result<LotteryData> {
    let data: LotteryData = serde_json::from_str(json).context("Échec du décodage du document")?;
    Ok(data)
}

/// Fichiers `*.json` d'un répertoire, triés par nom.
pub fn list_lottery_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Impossible de lister {:?}", dir))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `DD-MM-YYYY`, ou ISO `YYYY-MM-DD`. `None` pour tout le reste.
pub fn parse_draw_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DRAW_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT))
        .ok()
}

pub fn format_draw_date(date: NaiveDate) -> String {
    date.format(DRAW_DATE_FORMAT).to_string()
}

/// Écart absolu en jours calendaires.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

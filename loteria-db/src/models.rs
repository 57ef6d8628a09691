use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// `null` dans le document vaut la valeur par défaut, comme un champ absent.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Document JSON produit par les scrapers, une loterie par fichier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LotteryData {
    #[serde(deserialize_with = "null_as_default")]
    pub lottery_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_updated: String,
    #[serde(deserialize_with = "null_as_default")]
    pub positions_count: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub analysis_period: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_processed: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub numbers: BTreeMap<String, NumberData>,
    #[serde(deserialize_with = "null_as_default")]
    pub coldest_numbers: Vec<NumberHeat>,
    #[serde(deserialize_with = "null_as_default")]
    pub hottest_numbers: Vec<NumberHeat>,
    #[serde(rename = "repeatedInLast30Days", deserialize_with = "null_as_default")]
    pub repeated_in_last_30_days: BTreeMap<String, RepeatedNumber>,
    #[serde(deserialize_with = "null_as_default")]
    pub winning_numbers: Vec<WinningNumber>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberData {
    pub days_since_seen: Option<i64>,
    pub last_seen: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub positions: PositionCounts,
    #[serde(deserialize_with = "null_as_default")]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionCounts {
    #[serde(deserialize_with = "null_as_default")]
    pub first: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub second: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub third: u32,
}

impl PositionCounts {
    pub fn total(&self) -> u32 {
        self.first + self.second + self.third
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub position: u8,
    pub days_ago: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberHeat {
    #[serde(deserialize_with = "null_as_default")]
    pub number: String,
    pub days_since_seen: Option<i64>,
    pub last_seen: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatedNumber {
    #[serde(deserialize_with = "null_as_default")]
    pub occurrences: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WinningNumber {
    #[serde(deserialize_with = "null_as_default")]
    pub number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub position: u8,
}

/// Une sortie d'un numéro à une position, telle qu'enregistrée dans l'historique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    pub date: String,
    pub number: String,
    pub position: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Second,
    Third,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::First, Position::Second, Position::Third];

    pub fn ordinal(&self) -> u8 {
        match self {
            Position::First => 1,
            Position::Second => 2,
            Position::Third => 3,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            1 => Some(Position::First),
            2 => Some(Position::Second),
            3 => Some(Position::Third),
            _ => None,
        }
    }

    pub fn count_in(&self, counts: &PositionCounts) -> u32 {
        match self {
            Position::First => counts.first,
            Position::Second => counts.second,
            Position::Third => counts.third,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::First => write!(f, "1re"),
            Position::Second => write!(f, "2e"),
            Position::Third => write!(f, "3e"),
        }
    }
}

impl LotteryData {
    /// La stratégie des 3 numéros ne s'applique qu'aux loteries à 3 positions.
    pub fn is_three_position(&self) -> bool {
        self.positions_count == 3
    }

    /// Partie date de `lastUpdated` ("DD-MM-YYYY HH:MM:SS" → "DD-MM-YYYY").
    pub fn last_update_date(&self) -> Option<&str> {
        self.last_updated.split_whitespace().next()
    }

    pub fn draw_records(&self) -> Vec<DrawRecord> {
        self.numbers
            .iter()
            .flat_map(|(number, data)| {
                data.history.iter().map(move |entry| DrawRecord {
                    date: entry.date.clone(),
                    number: number.clone(),
                    position: entry.position,
                })
            })
            .collect()
    }
}

pub fn validate_number(number: &str) -> Result<()> {
    if number.is_empty() {
        bail!("Numéro vide");
    }
    if !number.chars().all(|c| c.is_ascii_digit()) {
        bail!("Numéro invalide : '{}' (chiffres uniquement)", number);
    }
    if number.len() > 2 {
        bail!("Numéro hors limites : '{}' (00-99)", number);
    }
    Ok(())
}

/// Normalise "5" en "05", format des clés du document.
pub fn normalize_number(number: &str) -> Result<String> {
    let trimmed = number.trim();
    validate_number(trimmed)?;
    Ok(format!("{:0>2}", trimmed))
}

use serde::Serialize;

use loteria_db::db::parse_draw_date;
use loteria_db::models::{HistoryEntry, LotteryData, NumberHeat, Position, PositionCounts, RepeatedNumber};

pub fn coldest(data: &LotteryData, n: usize) -> Vec<NumberHeat> {
    data.coldest_numbers.iter().take(n).cloned().collect()
}

pub fn hottest(data: &LotteryData, n: usize) -> Vec<NumberHeat> {
    data.hottest_numbers.iter().take(n).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatedEntry {
    pub number: String,
    pub occurrences: u32,
    pub dates: Vec<String>,
}

/// Numéros sortis plusieurs fois sur 30 jours, les plus répétés d'abord.
pub fn repeated_last_30_days(data: &LotteryData, n: usize) -> Vec<RepeatedEntry> {
    let mut entries: Vec<RepeatedEntry> = data
        .repeated_in_last_30_days
        .iter()
        .map(|(number, repeated)| RepeatedEntry {
            number: number.clone(),
            occurrences: repeated.occurrences,
            dates: repeated.dates.clone(),
        })
        .collect();
    entries.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    entries.truncate(n);
    entries
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WinnerSource {
    LastSeen,
    ZeroDays,
    WinningList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestWinners {
    pub date: Option<String>,
    pub numbers: Vec<String>,
    pub source: WinnerSource,
}

/// Numéros du dernier tirage connu : `lastSeen` = date de mise à jour,
/// sinon `daysSinceSeen` = 0, sinon la liste `winningNumbers` du document.
pub fn latest_winners(data: &LotteryData) -> Option<LatestWinners> {
    let update_date = data.last_update_date().map(str::to_string);

    if let Some(date) = &update_date {
        let numbers: Vec<String> = data
            .numbers
            .iter()
            .filter(|(_, n)| n.last_seen.as_deref() == Some(date.as_str()))
            .map(|(number, _)| number.clone())
            .collect();
        if !numbers.is_empty() {
            return Some(LatestWinners {
                date: update_date.clone(),
                numbers,
                source: WinnerSource::LastSeen,
            });
        }
    }

    let numbers: Vec<String> = data
        .numbers
        .iter()
        .filter(|(_, n)| n.days_since_seen == Some(0))
        .map(|(number, _)| number.clone())
        .collect();
    if !numbers.is_empty() {
        return Some(LatestWinners {
            date: update_date,
            numbers,
            source: WinnerSource::ZeroDays,
        });
    }

    let numbers: Vec<String> = data
        .winning_numbers
        .iter()
        .filter(|w| !w.number.is_empty())
        .map(|w| w.number.clone())
        .collect();
    if numbers.is_empty() {
        return None;
    }
    Some(LatestWinners {
        date: data.winning_numbers.first().map(|w| w.date.clone()),
        numbers,
        source: WinnerSource::WinningList,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionFilter {
    #[default]
    Any,
    Only(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Number,
    DaysSinceSeen,
    Frequency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberRow {
    pub number: String,
    pub positions: PositionCounts,
    pub frequency: u32,
    pub days_since_seen: Option<i64>,
    pub last_seen: Option<String>,
}

/// Grille des numéros : filtre de position, recherche (termes déjà normalisés "05"), tri.
pub fn number_rows(
    data: &LotteryData,
    filter: PositionFilter,
    sort: SortKey,
    search: &[String],
) -> Vec<NumberRow> {
    let mut rows: Vec<NumberRow> = data
        .numbers
        .iter()
        .filter(|(_, n)| match filter {
            PositionFilter::Any => true,
            PositionFilter::Only(position) => position.count_in(&n.positions) > 0,
        })
        .filter(|(number, _)| search.is_empty() || search.iter().any(|term| number.contains(term.as_str())))
        .map(|(number, n)| NumberRow {
            number: number.clone(),
            positions: n.positions,
            frequency: n.positions.total(),
            days_since_seen: n.days_since_seen,
            last_seen: n.last_seen.clone(),
        })
        .collect();

    match sort {
        SortKey::Number => rows.sort_by_key(|r| r.number.parse::<u32>().unwrap_or(u32::MAX)),
        // Les numéros jamais vus passent en dernier
        SortKey::DaysSinceSeen => rows.sort_by(|a, b| match (a.days_since_seen, b.days_since_seen) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
        SortKey::Frequency => rows.sort_by(|a, b| b.frequency.cmp(&a.frequency)),
    }
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WinnerStatus {
    /// Sorti au tirage de la dernière mise à jour.
    LastDraw { date: String },
    WinningList { position: u8, date: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct NumberDetail {
    pub number: String,
    pub positions: PositionCounts,
    pub frequency: u32,
    pub days_since_seen: Option<i64>,
    pub last_seen: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub repeated: Option<RepeatedNumber>,
    pub winner: Option<WinnerStatus>,
}

/// Fiche d'un numéro (clé du document, ex. "05"), historique le plus récent d'abord.
pub fn number_detail(data: &LotteryData, number: &str) -> Option<NumberDetail> {
    let entry = data.numbers.get(number)?;

    let mut history = entry.history.clone();
    history.sort_by(|a, b| parse_draw_date(&b.date).cmp(&parse_draw_date(&a.date)));

    let update_date = data.last_update_date();
    let winner = match (update_date, entry.last_seen.as_deref()) {
        (Some(update), Some(seen)) if update == seen => Some(WinnerStatus::LastDraw { date: seen.to_string() }),
        _ => data
            .winning_numbers
            .iter()
            .find(|w| w.number == number)
            .map(|w| WinnerStatus::WinningList { position: w.position, date: w.date.clone() }),
    };

    Some(NumberDetail {
        number: number.to_string(),
        positions: entry.positions,
        frequency: entry.positions.total(),
        days_since_seen: entry.days_since_seen,
        last_seen: entry.last_seen.clone(),
        history,
        repeated: data.repeated_in_last_30_days.get(number).cloned(),
        winner,
    })
}

const DAYS_BUCKET_WIDTH: i64 = 10;
const DAYS_BUCKET_COUNT: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaysBucket {
    pub label: String,
    pub count: usize,
}

/// Répartition des jours sans sortie par tranches de 10 ; la dernière tranche
/// reçoit aussi les numéros jamais sortis.
pub fn days_distribution(data: &LotteryData) -> Vec<DaysBucket> {
    let mut counts = [0usize; DAYS_BUCKET_COUNT];
    for entry in data.numbers.values() {
        let idx = match entry.days_since_seen {
            Some(days) => ((days.max(0) / DAYS_BUCKET_WIDTH) as usize).min(DAYS_BUCKET_COUNT - 1),
            None => DAYS_BUCKET_COUNT - 1,
        };
        counts[idx] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let start = i as i64 * DAYS_BUCKET_WIDTH;
            let label = if i == DAYS_BUCKET_COUNT - 1 {
                format!("{}+", start)
            } else {
                format!("{}-{}", start, start + DAYS_BUCKET_WIDTH - 1)
            };
            DaysBucket { label, count }
        })
        .collect()
}

/// Période d'analyse découpée en années (365 j), mois (30 j) et jours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodBreakdown {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl PeriodBreakdown {
    pub fn from_days(total: u32) -> Self {
        let years = total / 365;
        let rest = total % 365;
        Self {
            years,
            months: rest / 30,
            days: rest % 30,
        }
    }
}

impl std::fmt::Display for PeriodBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.years > 0 {
            parts.push(format!("{} an{}", self.years, if self.years > 1 { "s" } else { "" }));
        }
        if self.months > 0 {
            parts.push(format!("{} mois", self.months));
        }
        if self.days > 0 || (self.years == 0 && self.months == 0) {
            parts.push(format!("{} jour{}", self.days, if self.days > 1 { "s" } else { "" }));
        }
        write!(f, "{}", parts.join(" "))
    }
}

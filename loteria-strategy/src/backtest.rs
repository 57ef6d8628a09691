use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::appearances::{appearances_by_date, AppearanceMap};
use crate::scanner::{percentage, scan_dates, CandidatePattern, PatternStatus};

/// Un tirage rejoué : numéros gagnants, candidats actifs la veille, intersection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SorteoCoincidenceRecord {
    pub date: NaiveDate,
    pub winning_numbers: Vec<String>,
    pub candidates: Vec<String>,
    pub coincidences: Vec<String>,
    pub coincidence_count: usize,
}

impl SorteoCoincidenceRecord {
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

pub struct Backtester<'a> {
    map: &'a AppearanceMap,
    by_date: BTreeMap<NaiveDate, Vec<String>>,
    window: i64,
}

impl<'a> Backtester<'a> {
    pub fn new(map: &'a AppearanceMap, window: i64) -> Self {
        Self {
            map,
            by_date: appearances_by_date(map),
            window,
        }
    }

    /// Dates de tirage connues, en ordre chronologique.
    pub fn draw_dates(&self) -> Vec<NaiveDate> {
        self.by_date.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Candidats actifs à `date`, en ne voyant que les sorties strictement antérieures.
    pub fn active_candidates_before(&self, date: NaiveDate) -> Vec<CandidatePattern> {
        let mut active = Vec::new();
        for (number, appearances) in self.map {
            let known: Vec<NaiveDate> = appearances
                .iter()
                .rev()
                .map(|a| a.date)
                .take_while(|&d| d < date)
                .collect();
            if known.len() < 2 {
                continue;
            }
            active.extend(
                scan_dates(number, &known, date, self.window)
                    .into_iter()
                    .filter(|p| p.status == PatternStatus::Active),
            );
        }
        active
    }

    pub fn evaluate(&self, date: NaiveDate) -> SorteoCoincidenceRecord {
        let winning_numbers = self.by_date.get(&date).cloned().unwrap_or_default();
        let candidates: Vec<String> = self
            .active_candidates_before(date)
            .into_iter()
            .map(|p| p.number)
            .collect();
        let coincidences: Vec<String> = candidates
            .iter()
            .filter(|n| winning_numbers.contains(n))
            .cloned()
            .collect();

        SorteoCoincidenceRecord {
            date,
            coincidence_count: coincidences.len(),
            winning_numbers,
            candidates,
            coincidences,
        }
    }
}

/// Rejoue chaque tirage ; `on_progress(fait, total)` est appelé après chaque date.
pub fn run_backtest<F>(map: &AppearanceMap, window: i64, mut on_progress: F) -> Vec<SorteoCoincidenceRecord>
where
    F: FnMut(usize, usize),
{
    let backtester = Backtester::new(map, window);
    let total = backtester.len();
    log::info!("Rejeu de {} tirages (fenêtre {} j)", total, window);

    let mut records = Vec::with_capacity(total);
    for date in backtester.draw_dates() {
        records.push(backtester.evaluate(date));
        on_progress(records.len(), total);
    }
    records
}

/// Répartition des coïncidences (0, 1, 2, 3+) sur les tirages à peu de candidats.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoincidenceBuckets {
    pub max_candidates: usize,
    pub draws: usize,
    pub counts: [usize; 4],
    pub at_least_one: usize,
    pub at_least_two: usize,
    pub exactly_three: usize,
    pub avg_candidates: f64,
}

impl CoincidenceBuckets {
    pub fn from_records(records: &[SorteoCoincidenceRecord], max_candidates: usize) -> Self {
        let selected: Vec<&SorteoCoincidenceRecord> = records
            .iter()
            .filter(|r| (1..=max_candidates).contains(&r.candidate_count()))
            .collect();

        let mut counts = [0usize; 4];
        for record in &selected {
            counts[record.coincidence_count.min(3)] += 1;
        }

        let avg_candidates = if selected.is_empty() {
            0.0
        } else {
            selected.iter().map(|r| r.candidate_count()).sum::<usize>() as f64 / selected.len() as f64
        };

        Self {
            max_candidates,
            draws: selected.len(),
            counts,
            at_least_one: counts[1] + counts[2] + counts[3],
            at_least_two: counts[2] + counts[3],
            exactly_three: counts[3],
            avg_candidates,
        }
    }

    /// Part en pourcentage, arrondie au dixième.
    pub fn share(&self, count: usize) -> f64 {
        if self.draws == 0 {
            return 0.0;
        }
        (count as f64 / self.draws as f64 * 1000.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub total_draws: usize,
    pub two_hits: usize,
    pub three_hits: usize,
    pub two_hit_rate: u32,
    pub three_hit_rate: u32,
    pub buckets: CoincidenceBuckets,
}

pub fn summarize(records: &[SorteoCoincidenceRecord], max_candidates: usize) -> BacktestSummary {
    let mut two_hits = 0;
    let mut three_hits = 0;
    for record in records {
        // Un seul candidat actif ne peut pas produire de coïncidence multiple
        if record.candidate_count() < 2 {
            continue;
        }
        match record.coincidence_count {
            2 => two_hits += 1,
            3 => three_hits += 1,
            _ => {}
        }
    }

    BacktestSummary {
        total_draws: records.len(),
        two_hits,
        three_hits,
        two_hit_rate: percentage(two_hits, records.len()),
        three_hit_rate: percentage(three_hits, records.len()),
        buckets: CoincidenceBuckets::from_records(records, max_candidates),
    }
}

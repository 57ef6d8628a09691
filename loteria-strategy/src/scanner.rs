use chrono::{Duration, NaiveDate};
use loteria_db::db::days_between;
use serde::Serialize;

use crate::appearances::{AppearanceMap, NumberAppearance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternStatus {
    Active,
    Completed,
    Failed,
}

impl std::fmt::Display for PatternStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternStatus::Active => write!(f, "ACTIF"),
            PatternStatus::Completed => write!(f, "RÉUSSI"),
            PatternStatus::Failed => write!(f, "ÉCHEC"),
        }
    }
}

/// Deux sorties d'un même numéro dans la fenêtre, et ce qu'il en est advenu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidatePattern {
    pub number: String,
    pub first_date: NaiveDate,
    pub second_date: NaiveDate,
    pub third_date: Option<NaiveDate>,
    pub days_between: i64,
    /// Jours entre la 1re et la 3e sortie.
    pub days_to_third: Option<i64>,
    pub days_after_second: Option<i64>,
    pub days_since_second: Option<i64>,
    pub days_remaining: Option<i64>,
    pub status: PatternStatus,
}

impl CandidatePattern {
    pub fn is_finalized(&self) -> bool {
        self.status != PatternStatus::Active
    }

    /// Dernier jour couvert : la 3e sortie, sinon la fin de la fenêtre après la 2e.
    pub fn span_end(&self, window: i64) -> NaiveDate {
        match self.third_date {
            Some(third) => third,
            None => self.second_date + Duration::days(window),
        }
    }

    fn blocks(&self, date: NaiveDate, window: i64) -> bool {
        self.is_finalized() && date >= self.first_date && date <= self.span_end(window)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternStatistics {
    pub total_triggers: usize,
    pub completed: usize,
    pub failed: usize,
    pub active: usize,
    pub success_rate: u32,
}

impl PatternStatistics {
    pub fn from_patterns(patterns: &[CandidatePattern]) -> Self {
        let count = |status: PatternStatus| patterns.iter().filter(|p| p.status == status).count();
        let completed = count(PatternStatus::Completed);
        Self {
            total_triggers: patterns.len(),
            completed,
            failed: count(PatternStatus::Failed),
            active: count(PatternStatus::Active),
            success_rate: percentage(completed, patterns.len()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub patterns: Vec<CandidatePattern>,
    pub statistics: PatternStatistics,
}

/// round(part / total × 100), 0 si total = 0.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

/// Analyse un numéro à la date de référence `as_of` (incluse).
/// Les sorties postérieures à `as_of` sont ignorées.
pub fn scan_number(
    number: &str,
    appearances: &[NumberAppearance],
    as_of: NaiveDate,
    window: i64,
) -> Vec<CandidatePattern> {
    let mut dates: Vec<NaiveDate> = appearances
        .iter()
        .map(|a| a.date)
        .filter(|&d| d <= as_of)
        .collect();
    dates.sort();
    dates.dedup();
    scan_dates(number, &dates, as_of, window)
}

/// `dates` : dates connues, sans doublon, en ordre chronologique, toutes <= `as_of`.
pub fn scan_dates(
    number: &str,
    dates: &[NaiveDate],
    as_of: NaiveDate,
    window: i64,
) -> Vec<CandidatePattern> {
    let mut patterns: Vec<CandidatePattern> = Vec::new();

    for i in 0..dates.len().saturating_sub(1) {
        let first = dates[i];
        if patterns.iter().any(|p| p.blocks(first, window)) {
            continue;
        }

        // Seule la première paire valide partant de i compte
        let mut second_idx = None;
        for j in (i + 1)..dates.len() {
            if days_between(first, dates[j]) <= window {
                second_idx = Some(j);
                break;
            }
        }
        let Some(j) = second_idx else {
            continue;
        };

        let second = dates[j];
        let days_between_pair = days_between(first, second);
        let third = dates[j + 1..]
            .iter()
            .copied()
            .find(|&d| d > second && days_between(second, d) <= window);

        let pattern = match third {
            Some(third) => CandidatePattern {
                number: number.to_string(),
                first_date: first,
                second_date: second,
                third_date: Some(third),
                days_between: days_between_pair,
                days_to_third: Some(days_between(first, third)),
                days_after_second: Some(days_between(second, third)),
                days_since_second: None,
                days_remaining: None,
                status: PatternStatus::Completed,
            },
            None => {
                let since = days_between(second, as_of);
                let status = if since > window {
                    PatternStatus::Failed
                } else {
                    PatternStatus::Active
                };
                let (days_since_second, days_remaining) = match status {
                    PatternStatus::Active => (Some(since), Some((window - since).max(0))),
                    _ => (None, None),
                };
                CandidatePattern {
                    number: number.to_string(),
                    first_date: first,
                    second_date: second,
                    third_date: None,
                    days_between: days_between_pair,
                    days_to_third: None,
                    days_after_second: None,
                    days_since_second,
                    days_remaining,
                    status,
                }
            }
        };
        patterns.push(pattern);
    }

    patterns
}

pub fn scan_all(map: &AppearanceMap, as_of: NaiveDate, window: i64) -> ScanResult {
    let patterns: Vec<CandidatePattern> = map
        .iter()
        .filter(|(_, appearances)| appearances.len() >= 2)
        .flat_map(|(number, appearances)| scan_number(number, appearances, as_of, window))
        .collect();
    let statistics = PatternStatistics::from_patterns(&patterns);
    log::debug!(
        "{} déclencheurs au {} (fenêtre {} j)",
        statistics.total_triggers,
        as_of,
        window
    );
    ScanResult { patterns, statistics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearances::build_appearance_map;
    use crate::make_test_data;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scan(dates: &[&str], today: NaiveDate, window: i64) -> Vec<CandidatePattern> {
        let data = make_test_data(&[("05", dates)]);
        let map = build_appearance_map(&data);
        scan_number("05", &map["05"], today, window)
    }

    #[test]
    fn test_third_appearance_completes_pattern() {
        let patterns = scan(&["2024-01-01", "2024-01-05", "2024-01-10"], ymd(2024, 2, 1), 10);
        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.status, PatternStatus::Completed);
        assert_eq!(p.first_date, ymd(2024, 1, 1));
        assert_eq!(p.second_date, ymd(2024, 1, 5));
        assert_eq!(p.third_date, Some(ymd(2024, 1, 10)));
        assert_eq!(p.days_between, 4);
        assert_eq!(p.days_to_third, Some(9));
        assert_eq!(p.days_after_second, Some(5));
    }

    #[test]
    fn test_expired_window_fails_pattern() {
        let patterns = scan(&["2024-01-01", "2024-01-05"], ymd(2024, 1, 20), 10);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].status, PatternStatus::Failed);
        assert_eq!(patterns[0].third_date, None);
        assert_eq!(patterns[0].days_remaining, None);
    }

    #[test]
    fn test_open_window_is_active() {
        let patterns = scan(&["2024-01-01", "2024-01-05"], ymd(2024, 1, 8), 10);
        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.status, PatternStatus::Active);
        assert_eq!(p.days_since_second, Some(3));
        assert_eq!(p.days_remaining, Some(7));
    }

    #[test]
    fn test_last_day_of_window_is_still_active() {
        let patterns = scan(&["2024-01-01", "2024-01-05"], ymd(2024, 1, 15), 10);
        assert_eq!(patterns[0].status, PatternStatus::Active);
        assert_eq!(patterns[0].days_remaining, Some(0));

        let patterns = scan(&["2024-01-01", "2024-01-05"], ymd(2024, 1, 16), 10);
        assert_eq!(patterns[0].status, PatternStatus::Failed);
    }

    #[test]
    fn test_future_appearances_are_ignored() {
        // La 3e sortie existe mais après la date de référence
        let patterns = scan(&["2024-01-01", "2024-01-05", "2024-01-10"], ymd(2024, 1, 8), 10);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].status, PatternStatus::Active);
        assert_eq!(patterns[0].days_remaining, Some(7));
    }

    #[test]
    fn test_pair_outside_window_is_not_a_trigger() {
        let patterns = scan(&["2024-01-01", "2024-01-12"], ymd(2024, 2, 1), 10);
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_legacy_window() {
        let dates = ["2024-01-01", "2024-01-05", "2024-01-14"];
        let patterns = scan(&dates, ymd(2024, 2, 1), 10);
        assert_eq!(patterns[0].status, PatternStatus::Completed);

        // 9 jours après la 2e sortie : hors fenêtre de 7 jours
        let patterns = scan(&dates, ymd(2024, 2, 1), 7);
        assert_eq!(patterns[0].status, PatternStatus::Failed);
    }

    #[test]
    fn test_third_is_not_reused_as_new_first() {
        let patterns = scan(
            &["2024-01-01", "2024-01-03", "2024-01-05", "2024-01-07", "2024-01-12", "2024-02-20"],
            ymd(2024, 3, 1),
            10,
        );
        // (01, 03) → 05, puis le 05 consommé ne forme pas de couple avec le 07
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].status, PatternStatus::Completed);
        assert_eq!(patterns[0].third_date, Some(ymd(2024, 1, 5)));
        assert_eq!(patterns[1].first_date, ymd(2024, 1, 7));
        assert_eq!(patterns[1].second_date, ymd(2024, 1, 12));
        assert_eq!(patterns[1].status, PatternStatus::Failed);
    }

    #[test]
    fn test_finalized_intervals_never_overlap() {
        // Série dense : une sortie tous les 3 ou 4 jours pendant un an, avec des trous
        let mut dates = Vec::new();
        let mut d = ymd(2023, 1, 1);
        let mut step = 0;
        while d < ymd(2024, 1, 1) {
            dates.push(d.format("%d-%m-%Y").to_string());
            step += 1;
            let gap = match step % 5 {
                0 => 15,
                1 | 2 => 3,
                _ => 4,
            };
            d += Duration::days(gap);
        }
        let refs: Vec<&str> = dates.iter().map(|s| s.as_str()).collect();
        let patterns = scan(&refs, ymd(2024, 6, 1), 10);
        assert!(!patterns.is_empty());

        let finalized: Vec<&CandidatePattern> = patterns.iter().filter(|p| p.is_finalized()).collect();
        for (a, b) in finalized.iter().zip(finalized.iter().skip(1)) {
            assert!(b.first_date > a.span_end(10), "{:?} chevauche {:?}", b, a);
        }
        for p in &patterns {
            assert!(p.second_date > p.first_date);
            assert!(p.days_between <= 10);
        }
    }

    #[test]
    fn test_at_most_one_active_per_number() {
        let patterns = scan(
            &["2024-01-01", "2024-01-04", "2024-01-20", "2024-01-25"],
            ymd(2024, 1, 27),
            10,
        );
        let active = patterns.iter().filter(|p| p.status == PatternStatus::Active).count();
        assert_eq!(active, 1);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].status, PatternStatus::Failed);
    }

    #[test]
    fn test_single_appearance_gives_nothing() {
        assert!(scan(&["2024-01-01"], ymd(2024, 1, 2), 10).is_empty());
    }

    #[test]
    fn test_scan_all_statistics() {
        let data = make_test_data(&[
            ("01", &["2024-01-01", "2024-01-05", "2024-01-10"]),
            ("02", &["2024-01-01", "2024-01-05", "2024-01-08"]),
            ("03", &["2024-01-01", "2024-01-05"]),
            ("04", &["2024-01-20", "2024-01-22"]),
            ("05", &["2024-01-01"]),
        ]);
        let map = build_appearance_map(&data);
        let result = scan_all(&map, ymd(2024, 1, 25), 10);
        let stats = &result.statistics;
        assert_eq!(stats.total_triggers, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.success_rate, 50);
    }

    #[test]
    fn test_success_rate_rounding() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let data = make_test_data(&[
            ("11", &["2024-03-01", "2024-03-04", "2024-03-12", "2024-04-01"]),
            ("27", &["2024-03-02", "2024-03-09"]),
            ("90", &["2024-02-01", "2024-02-10", "2024-02-15"]),
        ]);
        let map = build_appearance_map(&data);
        let today = ymd(2024, 4, 5);
        let a = serde_json::to_string(&scan_all(&map, today, 10)).unwrap();
        let b = serde_json::to_string(&scan_all(&map, today, 10)).unwrap();
        assert_eq!(a, b);
    }
}

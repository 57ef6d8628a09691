pub mod appearances;
pub mod backtest;
pub mod config;
pub mod daystats;
pub mod overview;
pub mod scanner;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use loteria_db::models::LotteryData;

use crate::appearances::build_appearance_map;
use crate::config::StrategyConfig;
use crate::daystats::{categorize, ActiveCandidate, DayByDayStats};
use crate::scanner::{scan_all, CandidatePattern, PatternStatistics, PatternStatus};

#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub lottery_name: String,
    pub as_of: NaiveDate,
    pub window: i64,
    pub statistics: PatternStatistics,
    pub day_stats: DayByDayStats,
    pub active_candidates: Vec<ActiveCandidate>,
    pub history: Vec<CandidatePattern>,
}

/// Stratégie des 3 numéros au jour `today`. `None` si la loterie n'a pas 3 positions.
pub fn run_strategy(
    data: &LotteryData,
    today: NaiveDate,
    config: &StrategyConfig,
) -> Result<Option<StrategyReport>> {
    config.validate()?;
    if !data.is_three_position() {
        log::info!(
            "{} : {} positions, stratégie des 3 numéros non applicable",
            data.lottery_name,
            data.positions_count
        );
        return Ok(None);
    }

    let map = build_appearance_map(data);
    let scan = scan_all(&map, today, config.window);
    let day_stats = DayByDayStats::from_patterns(&scan.patterns, config.window);

    let (active, mut history): (Vec<CandidatePattern>, Vec<CandidatePattern>) = scan
        .patterns
        .into_iter()
        .partition(|p| p.status == PatternStatus::Active);

    let mut active_candidates = categorize(active, &day_stats, config);
    active_candidates.sort_by(|a, b| {
        a.pattern
            .days_remaining
            .cmp(&b.pattern.days_remaining)
            .then_with(|| a.pattern.number.cmp(&b.pattern.number))
    });

    history.sort_by(|a, b| {
        b.first_date
            .cmp(&a.first_date)
            .then_with(|| a.number.cmp(&b.number))
    });
    if let Some(limit) = config.history_limit {
        history.truncate(limit);
    }

    log::info!(
        "{} au {} : {} déclencheurs, {} actifs",
        data.lottery_name,
        today,
        scan.statistics.total_triggers,
        active_candidates.len()
    );

    Ok(Some(StrategyReport {
        lottery_name: data.lottery_name.clone(),
        as_of: today,
        window: config.window,
        statistics: scan.statistics,
        day_stats,
        active_candidates,
        history,
    }))
}

/// Document minimal à 3 positions : chaque numéro reçoit ses dates, position tournante.
#[cfg(test)]
pub(crate) fn make_test_data(entries: &[(&str, &[&str])]) -> LotteryData {
    use loteria_db::models::{HistoryEntry, NumberData};

    let numbers = entries
        .iter()
        .map(|(number, dates)| {
            let history = dates
                .iter()
                .enumerate()
                .map(|(idx, date)| HistoryEntry {
                    date: date.to_string(),
                    position: (idx % 3) as u8 + 1,
                    days_ago: None,
                })
                .collect();
            (number.to_string(), NumberData { history, ..Default::default() })
        })
        .collect();

    LotteryData {
        lottery_name: "Test".into(),
        last_updated: "01-01-2024 00:00:00".into(),
        positions_count: 3,
        numbers,
        ..Default::default()
    }
}

use serde::Serialize;

use crate::config::StrategyConfig;
use crate::scanner::{percentage, CandidatePattern, PatternStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayStat {
    pub day: i64,
    pub count: usize,
    pub percentage: u32,
}

/// Jour (après la 2e sortie) où la 3e sortie est arrivée, sur les motifs réussis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayByDayStats {
    pub window: i64,
    pub total_completed: usize,
    pub days: Vec<DayStat>,
}

impl DayByDayStats {
    pub fn from_patterns(patterns: &[CandidatePattern], window: i64) -> Self {
        let mut counts = vec![0usize; window.max(0) as usize];
        let mut total_completed = 0;

        for pattern in patterns.iter().filter(|p| p.status == PatternStatus::Completed) {
            total_completed += 1;
            if let Some(day) = pattern.days_after_second {
                if (1..=window).contains(&day) {
                    counts[(day - 1) as usize] += 1;
                }
            }
        }

        let days = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| DayStat {
                day: i as i64 + 1,
                count,
                percentage: percentage(count, total_completed),
            })
            .collect();

        Self { window, total_completed, days }
    }

    pub fn percentage_for(&self, day: i64) -> u32 {
        if day < 1 || day > self.window {
            return 0;
        }
        self.days.get((day - 1) as usize).map(|d| d.percentage).unwrap_or(0)
    }

    /// Jour le plus fréquent ; le plus tôt en cas d'égalité.
    pub fn most_likely_day(&self) -> Option<&DayStat> {
        self.days
            .iter()
            .filter(|d| d.count > 0)
            .fold(None, |best: Option<&DayStat>, d| match best {
                Some(b) if b.count >= d.count => Some(b),
                _ => Some(d),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbabilityCategory {
    High,
    Medium,
    Low,
}

impl ProbabilityCategory {
    pub fn from_percentage(pct: u32, config: &StrategyConfig) -> Self {
        if pct >= config.high_threshold {
            ProbabilityCategory::High
        } else if pct >= config.medium_threshold {
            ProbabilityCategory::Medium
        } else {
            ProbabilityCategory::Low
        }
    }
}

impl std::fmt::Display for ProbabilityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbabilityCategory::High => write!(f, "HAUTE"),
            ProbabilityCategory::Medium => write!(f, "MOYENNE"),
            ProbabilityCategory::Low => write!(f, "BASSE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveCandidate {
    #[serde(flatten)]
    pub pattern: CandidatePattern,
    pub category: ProbabilityCategory,
    pub today_day: i64,
    pub tomorrow_day: i64,
    pub today_probability: u32,
    pub tomorrow_probability: u32,
}

/// La catégorie vient du pourcentage historique du jour courant.
pub fn categorize(
    active: Vec<CandidatePattern>,
    stats: &DayByDayStats,
    config: &StrategyConfig,
) -> Vec<ActiveCandidate> {
    active
        .into_iter()
        .filter(|p| p.status == PatternStatus::Active)
        .map(|pattern| {
            let today_day = pattern.days_since_second.unwrap_or(0);
            let tomorrow_day = today_day + 1;
            let today_probability = stats.percentage_for(today_day);
            ActiveCandidate {
                category: ProbabilityCategory::from_percentage(today_probability, config),
                today_day,
                tomorrow_day,
                today_probability,
                tomorrow_probability: stats.percentage_for(tomorrow_day),
                pattern,
            }
        })
        .collect()
}

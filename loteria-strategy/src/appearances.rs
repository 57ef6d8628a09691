use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use loteria_db::db::parse_draw_date;
use loteria_db::models::{DrawRecord, LotteryData};

/// Une date de sortie d'un numéro, avec toutes les positions touchées ce jour-là.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberAppearance {
    pub date: NaiveDate,
    pub positions: BTreeSet<u8>,
}

/// numéro → apparitions, la plus récente en premier.
pub type AppearanceMap = BTreeMap<String, Vec<NumberAppearance>>;

pub fn build_appearance_map(data: &LotteryData) -> AppearanceMap {
    build_from_records(&data.draw_records())
}

/// Les dates illisibles sont écartées sans erreur.
pub fn build_from_records(records: &[DrawRecord]) -> AppearanceMap {
    let mut grouped: BTreeMap<&str, BTreeMap<NaiveDate, BTreeSet<u8>>> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        match parse_draw_date(&record.date) {
            Some(date) => {
                grouped
                    .entry(record.number.as_str())
                    .or_default()
                    .entry(date)
                    .or_default()
                    .insert(record.position);
            }
            None => {
                log::debug!("Date illisible ignorée pour {} : '{}'", record.number, record.date);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        log::debug!("{} entrées d'historique ignorées (date illisible)", dropped);
    }

    grouped
        .into_iter()
        .map(|(number, by_date)| {
            let appearances = by_date
                .into_iter()
                .rev()
                .map(|(date, positions)| NumberAppearance { date, positions })
                .collect();
            (number.to_string(), appearances)
        })
        .collect()
}

/// Vue inverse : date de tirage → numéros sortis ce jour-là (triés).
pub fn appearances_by_date(map: &AppearanceMap) -> BTreeMap<NaiveDate, Vec<String>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    for (number, appearances) in map {
        for appearance in appearances {
            by_date.entry(appearance.date).or_default().push(number.clone());
        }
    }
    by_date
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_data;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: &str, number: &str, position: u8) -> DrawRecord {
        DrawRecord { date: date.into(), number: number.into(), position }
    }

    #[test]
    fn test_same_day_hits_are_merged() {
        let records = vec![
            record("05-01-2024", "05", 1),
            record("05-01-2024", "05", 3),
            record("05-01-2024", "05", 3),
            record("01-01-2024", "05", 2),
        ];
        let map = build_from_records(&records);
        let apps = &map["05"];
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].date, date(5, 1, 2024));
        assert_eq!(apps[0].positions, BTreeSet::from([1, 3]));
        assert_eq!(apps[1].positions, BTreeSet::from([2]));
    }

    #[test]
    fn test_most_recent_first() {
        let data = make_test_data(&[("12", &["01-01-2024", "20-01-2024", "10-01-2024"])]);
        let map = build_appearance_map(&data);
        let dates: Vec<NaiveDate> = map["12"].iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![date(20, 1, 2024), date(10, 1, 2024), date(1, 1, 2024)]);
    }

    #[test]
    fn test_malformed_dates_are_dropped_silently() {
        let records = vec![
            record("05-01-2024", "05", 1),
            record("2024/01/07", "05", 1),
            record("", "05", 2),
            record("32-01-2024", "09", 1),
        ];
        let map = build_from_records(&records);
        assert_eq!(map["05"].len(), 1);
        // Aucun historique valide : le numéro disparaît de la carte
        assert!(!map.contains_key("09"));
    }

    #[test]
    fn test_no_duplicate_dates_per_number() {
        let data = make_test_data(&[
            ("05", &["01-01-2024", "01-01-2024", "2024-01-01", "03-01-2024"]),
            ("06", &["03-01-2024"]),
        ]);
        let map = build_appearance_map(&data);
        for apps in map.values() {
            let unique: BTreeSet<NaiveDate> = apps.iter().map(|a| a.date).collect();
            assert_eq!(unique.len(), apps.len());
            assert!(apps.iter().all(|a| !a.positions.is_empty()));
        }
        assert_eq!(map["05"].len(), 2);
    }

    #[test]
    fn test_empty_history_gives_empty_map() {
        let data = make_test_data(&[("00", &[])]);
        assert!(build_appearance_map(&data).is_empty());
    }

    #[test]
    fn test_appearances_by_date() {
        let data = make_test_data(&[
            ("05", &["01-01-2024", "03-01-2024"]),
            ("17", &["03-01-2024"]),
        ]);
        let by_date = appearances_by_date(&build_appearance_map(&data));
        assert_eq!(by_date.len(), 2);
        assert_eq!(by_date[&date(1, 1, 2024)], vec!["05".to_string()]);
        assert_eq!(by_date[&date(3, 1, 2024)], vec!["05".to_string(), "17".to_string()]);
    }
}

use std::path::PathBuf;

use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use textplots::Plot;

use loteria_db::db::format_draw_date;
use loteria_db::models::{LotteryData, NumberHeat, Position};
use loteria_strategy::backtest::{BacktestSummary, SorteoCoincidenceRecord};
use loteria_strategy::daystats::{DayByDayStats, ProbabilityCategory};
use loteria_strategy::overview::{
    coldest, days_distribution, hottest, latest_winners, repeated_last_30_days, DaysBucket, NumberDetail,
    NumberRow, PeriodBreakdown, WinnerSource, WinnerStatus,
};
use loteria_strategy::scanner::PatternStatus;
use loteria_strategy::StrategyReport;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn opt_days(days: Option<i64>) -> String {
    days.map(|d| d.to_string()).unwrap_or_else(|| "—".to_string())
}

pub fn display_lottery_files(files: &[PathBuf]) {
    if files.is_empty() {
        println!("Aucun fichier de loterie trouvé.");
        return;
    }
    let mut table = new_table(vec!["#", "Fichier"]);
    for (i, file) in files.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), file.display().to_string()]);
    }
    println!("{table}");
}

pub fn display_summary(data: &LotteryData) {
    println!("\n📊 {}\n", data.lottery_name);
    println!("  Dernière mise à jour : {}", data.last_updated);
    println!("  Période analysée     : {}", PeriodBreakdown::from_days(data.analysis_period));
    println!("  Tirages traités      : {}", data.total_processed);
    println!("  Positions            : {}", data.positions_count);

    match latest_winners(data) {
        Some(winners) => {
            let source = match winners.source {
                WinnerSource::LastSeen => "dernière sortie",
                WinnerSource::ZeroDays => "sortis aujourd'hui",
                WinnerSource::WinningList => "liste des gagnants",
            };
            println!(
                "\n── Derniers numéros gagnants ({}, {}) ──",
                winners.date.as_deref().unwrap_or("date inconnue"),
                source
            );
            println!("  {}", winners.numbers.join(" - "));
        }
        None => println!("\n── Derniers numéros gagnants ──\n  Aucun numéro gagnant connu."),
    }

    println!("\n── Numéros les plus froids ──");
    display_heat_table(&coldest(data, 5));

    println!("\n── Numéros les plus chauds ──");
    display_heat_table(&hottest(data, 5));

    println!("\n── Répétés sur 30 jours ──");
    let repeated = repeated_last_30_days(data, 5);
    if repeated.is_empty() {
        println!("  Aucune donnée.");
    } else {
        let mut table = new_table(vec!["Numéro", "Sorties", "Dates"]);
        for entry in &repeated {
            table.add_row(vec![
                entry.number.clone(),
                entry.occurrences.to_string(),
                entry.dates.join(", "),
            ]);
        }
        println!("{table}");
    }

    display_days_distribution(&days_distribution(data));
}

fn display_heat_table(numbers: &[NumberHeat]) {
    if numbers.is_empty() {
        println!("  Aucune donnée.");
        return;
    }
    let mut table = new_table(vec!["Numéro", "Jours sans sortie", "Dernière sortie"]);
    for heat in numbers {
        table.add_row(vec![
            heat.number.clone(),
            opt_days(heat.days_since_seen),
            heat.last_seen.clone().unwrap_or_else(|| "—".to_string()),
        ]);
    }
    println!("{table}");
}

pub fn display_days_distribution(buckets: &[DaysBucket]) {
    println!("\n── Répartition des jours sans sortie ──");
    if buckets.iter().all(|b| b.count == 0) {
        println!("  (Pas de données à afficher)");
        return;
    }

    let mut table = new_table(vec!["Jours", "Numéros"]);
    for bucket in buckets {
        table.add_row(vec![bucket.label.clone(), bucket.count.to_string()]);
    }
    println!("{table}");

    let points: Vec<(f32, f32)> = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| (i as f32 + 1.0, b.count as f32))
        .collect();
    let y_max = buckets.iter().map(|b| b.count).max().unwrap_or(0) as f32 + 1.0;
    let shape = textplots::Shape::Bars(&points);
    let mut chart = textplots::Chart::new_with_y_range(120, 40, 0.5, buckets.len() as f32 + 0.5, 0.0, y_max);
    println!("{}", chart.lineplot(&shape));
}

pub fn display_number_detail(detail: &NumberDetail, today: NaiveDate) {
    println!("\n🔎 Numéro {}\n", detail.number);
    println!("  Sorties totales   : {}", detail.frequency);
    println!("  Jours sans sortie : {}", opt_days(detail.days_since_seen));
    println!("  Dernière sortie   : {}", detail.last_seen.as_deref().unwrap_or("—"));

    let breakdown: Vec<String> = Position::ALL
        .iter()
        .map(|p| (p, p.count_in(&detail.positions)))
        .filter(|(_, count)| *count > 0)
        .map(|(p, count)| format!("{} fois en {}", count, p))
        .collect();
    if !breakdown.is_empty() {
        println!("  Positions         : {}", breakdown.join(", "));
    }

    match &detail.winner {
        Some(WinnerStatus::LastDraw { date }) if *date == format_draw_date(today) => {
            println!("\n  🏆 Gagnant du jour ({})", date);
        }
        Some(WinnerStatus::LastDraw { date }) => println!("\n  🏆 Sorti au dernier tirage ({})", date),
        Some(WinnerStatus::WinningList { position, date }) => {
            println!("\n  🏆 Numéro gagnant actuel : position {}, {}", position, date);
        }
        None => {}
    }

    if let Some(repeated) = &detail.repeated {
        println!(
            "\n  Répété sur 30 jours : {} fois ({})",
            repeated.occurrences,
            repeated.dates.join(", ")
        );
    }

    println!("\n── Historique des sorties ──");
    if detail.history.is_empty() {
        println!("  Aucune sortie enregistrée.");
        return;
    }
    let mut table = new_table(vec!["Date", "Position", "Il y a"]);
    for entry in &detail.history {
        let position = Position::from_ordinal(entry.position)
            .map(|p| p.to_string())
            .unwrap_or_else(|| format!("{}e", entry.position));
        let ago = entry
            .days_ago
            .map(|d| format!("{} j", d))
            .unwrap_or_else(|| "—".to_string());
        table.add_row(vec![entry.date.clone(), position, ago]);
    }
    println!("{table}");
}

pub fn display_number_rows(rows: &[NumberRow]) {
    if rows.is_empty() {
        println!("Aucun numéro ne correspond aux critères.");
        return;
    }
    let mut table = new_table(vec!["Numéro", "1re", "2e", "3e", "Total", "Jours sans sortie", "Dernière sortie"]);
    for row in rows {
        table.add_row(vec![
            row.number.clone(),
            row.positions.first.to_string(),
            row.positions.second.to_string(),
            row.positions.third.to_string(),
            row.frequency.to_string(),
            opt_days(row.days_since_seen),
            row.last_seen.clone().unwrap_or_else(|| "—".to_string()),
        ]);
    }
    println!("{table}");
    println!("{} numéros", rows.len());
}

fn category_color(category: ProbabilityCategory) -> Color {
    match category {
        ProbabilityCategory::High => Color::Green,
        ProbabilityCategory::Medium => Color::Yellow,
        ProbabilityCategory::Low => Color::Red,
    }
}

fn status_color(status: PatternStatus) -> Color {
    match status {
        PatternStatus::Active => Color::Cyan,
        PatternStatus::Completed => Color::Green,
        PatternStatus::Failed => Color::Red,
    }
}

pub fn display_strategy(report: &StrategyReport) {
    println!(
        "\n🎯 Stratégie des 3 numéros : {} au {} (fenêtre {} j)\n",
        report.lottery_name,
        format_draw_date(report.as_of),
        report.window
    );

    let stats = &report.statistics;
    let mut table = new_table(vec!["Déclencheurs", "Réussis", "Échecs", "Actifs", "Taux de réussite"]);
    table.add_row(vec![
        stats.total_triggers.to_string(),
        stats.completed.to_string(),
        stats.failed.to_string(),
        stats.active.to_string(),
        format!("{} %", stats.success_rate),
    ]);
    println!("{table}");

    println!("\n── Candidats actifs ──");
    if report.active_candidates.is_empty() {
        println!("  Aucun candidat actif.");
    } else {
        let mut table = new_table(vec![
            "Numéro", "1re sortie", "2e sortie", "Écart", "Jour", "Restants", "Auj.", "Demain", "Probabilité",
        ]);
        for candidate in &report.active_candidates {
            let p = &candidate.pattern;
            table.add_row(vec![
                Cell::new(&p.number),
                Cell::new(format_draw_date(p.first_date)),
                Cell::new(format_draw_date(p.second_date)),
                Cell::new(p.days_between),
                Cell::new(candidate.today_day),
                Cell::new(opt_days(p.days_remaining)),
                Cell::new(format!("{} %", candidate.today_probability)),
                Cell::new(format!("{} %", candidate.tomorrow_probability)),
                Cell::new(candidate.category.to_string()).fg(category_color(candidate.category)),
            ]);
        }
        println!("{table}");
    }

    println!("\n── Historique ──");
    if report.history.is_empty() {
        println!("  Aucun motif terminé.");
    } else {
        let mut table = new_table(vec!["Numéro", "1re sortie", "2e sortie", "3e sortie", "Écart", "Jours 1→3", "Statut"]);
        for pattern in &report.history {
            table.add_row(vec![
                Cell::new(&pattern.number),
                Cell::new(format_draw_date(pattern.first_date)),
                Cell::new(format_draw_date(pattern.second_date)),
                Cell::new(pattern.third_date.map(format_draw_date).unwrap_or_else(|| "—".to_string())),
                Cell::new(pattern.days_between),
                Cell::new(opt_days(pattern.days_to_third)),
                Cell::new(pattern.status.to_string()).fg(status_color(pattern.status)),
            ]);
        }
        println!("{table}");
    }

    display_day_stats(&report.day_stats);
}

pub fn display_day_stats(stats: &DayByDayStats) {
    println!("\n── Jour de la 3e sortie (après la 2e) ──");
    if stats.total_completed == 0 {
        println!("  (Pas de données à afficher)");
        return;
    }

    let mut table = new_table(vec!["Jour", "Réussites", "%"]);
    for day in &stats.days {
        table.add_row(vec![day.day.to_string(), day.count.to_string(), format!("{} %", day.percentage)]);
    }
    println!("{table}");

    if let Some(best) = stats.most_likely_day() {
        println!("  Jour le plus fréquent : {} ({} %)", best.day, best.percentage);
    }

    let points: Vec<(f32, f32)> = stats
        .days
        .iter()
        .map(|d| (d.day as f32, d.percentage as f32))
        .collect();
    let y_max = stats.days.iter().map(|d| d.percentage).max().unwrap_or(0) as f32 + 5.0;
    let shape = textplots::Shape::Bars(&points);
    let mut chart = textplots::Chart::new_with_y_range(120, 40, 0.5, stats.window as f32 + 0.5, 0.0, y_max);
    println!("{}", chart.lineplot(&shape));
}

pub fn display_backtest(summary: &BacktestSummary, records: &[SorteoCoincidenceRecord], last: usize) {
    println!("\n🔁 Rejeu sur {} tirages\n", summary.total_draws);

    let mut table = new_table(vec!["Coïncidences", "Tirages", "Taux"]);
    table.add_row(vec!["2 numéros".to_string(), summary.two_hits.to_string(), format!("{} %", summary.two_hit_rate)]);
    table.add_row(vec!["3 numéros".to_string(), summary.three_hits.to_string(), format!("{} %", summary.three_hit_rate)]);
    println!("{table}");

    let buckets = &summary.buckets;
    println!(
        "\n── Tirages avec 1 à {} candidats ({} tirages, {:.1} candidats en moyenne) ──",
        buckets.max_candidates, buckets.draws, buckets.avg_candidates
    );
    let mut table = new_table(vec!["Coïncidences", "Tirages", "Part"]);
    for (label, count) in [
        ("0", buckets.counts[0]),
        ("1", buckets.counts[1]),
        ("2", buckets.counts[2]),
        ("3+", buckets.counts[3]),
        ("Au moins 1", buckets.at_least_one),
        ("Au moins 2", buckets.at_least_two),
        ("Exactement 3", buckets.exactly_three),
    ] {
        table.add_row(vec![label.to_string(), count.to_string(), format!("{:.1} %", buckets.share(count))]);
    }
    println!("{table}");

    if last == 0 || records.is_empty() {
        return;
    }
    println!("\n── {} derniers tirages ──", last.min(records.len()));
    let mut table = new_table(vec!["Date", "Gagnants", "Candidats", "Coïncidences"]);
    for record in records.iter().rev().take(last) {
        let color = match record.coincidence_count {
            0 => Color::White,
            1 => Color::Yellow,
            _ => Color::Green,
        };
        table.add_row(vec![
            Cell::new(format_draw_date(record.date)),
            Cell::new(record.winning_numbers.join(" - ")),
            Cell::new(record.candidates.join(" - ")),
            Cell::new(record.coincidences.join(" - ")).fg(color),
        ]);
    }
    println!("{table}");
}

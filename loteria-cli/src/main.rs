mod display;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use loteria_db::db::{data_dir, data_path, list_lottery_files, load_lottery, parse_draw_date};
use loteria_db::models::{normalize_number, LotteryData, Position};
use loteria_strategy::appearances::build_appearance_map;
use loteria_strategy::backtest::{run_backtest, summarize};
use loteria_strategy::config::{StrategyConfig, LEGACY_WINDOW};
use loteria_strategy::overview::{number_detail, number_rows, PositionFilter, SortKey};
use loteria_strategy::run_strategy;

use crate::display::{
    display_backtest, display_lottery_files, display_number_detail, display_number_rows, display_strategy,
    display_summary,
};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum PositionArg {
    #[default]
    Any,
    First,
    Second,
    Third,
}

impl From<PositionArg> for PositionFilter {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Any => PositionFilter::Any,
            PositionArg::First => PositionFilter::Only(Position::First),
            PositionArg::Second => PositionFilter::Only(Position::Second),
            PositionArg::Third => PositionFilter::Only(Position::Third),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum SortArg {
    #[default]
    Number,
    Days,
    Frequency,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Number => SortKey::Number,
            SortArg::Days => SortKey::DaysSinceSeen,
            SortArg::Frequency => SortKey::Frequency,
        }
    }
}

#[derive(Parser)]
#[command(name = "loteria", about = "Analyse des loteries à 3 numéros et stratégie des 3 sorties")]
struct Cli {
    /// Document JSON de la loterie
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Configuration de la stratégie (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lister les documents de loterie disponibles
    List {
        /// Répertoire à parcourir (défaut : json_Datos)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Résumé : période, numéros froids, répétés, derniers gagnants
    Summary,

    /// Grille des numéros par position
    Numbers {
        /// Filtrer sur une position
        #[arg(short, long, default_value = "any")]
        position: PositionArg,

        /// Ordre d'affichage
        #[arg(short, long, default_value = "number")]
        sort: SortArg,

        /// Numéros recherchés, séparés par des virgules (ex: 5,17)
        #[arg(long)]
        search: Option<String>,
    },

    /// Fiche détaillée d'un numéro
    Number {
        /// Numéro (ex: 5 ou 05)
        number: String,
    },

    /// Candidats actifs, historique et statistiques de la stratégie
    Strategy {
        /// Date de référence (AAAA-MM-JJ ou JJ-MM-AAAA, défaut : aujourd'hui)
        #[arg(short, long)]
        today: Option<String>,

        /// Fenêtre en jours
        #[arg(short, long)]
        window: Option<i64>,

        /// Ancienne variante à 7 jours
        #[arg(long, conflicts_with = "window")]
        legacy: bool,

        /// Nombre maximal de motifs dans l'historique
        #[arg(long)]
        history: Option<usize>,

        /// Sortie JSON brute
        #[arg(long)]
        json: bool,
    },

    /// Rejouer la stratégie sur tout l'historique
    Backtest {
        /// Fenêtre en jours
        #[arg(short, long)]
        window: Option<i64>,

        /// Ancienne variante à 7 jours
        #[arg(long, conflicts_with = "window")]
        legacy: bool,

        /// Borne du nombre de candidats pour les statistiques par tranche
        #[arg(long)]
        max_candidates: Option<usize>,

        /// Nombre de tirages détaillés à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Afficher ou écrire la configuration par défaut
    Config {
        /// Fichier de sortie
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let file = cli.file.unwrap_or_else(data_path);
    let base_config = match &cli.config {
        Some(path) => StrategyConfig::load(path)?,
        None => StrategyConfig::default(),
    };

    match cli.command {
        Command::List { dir } => cmd_list(&dir.unwrap_or_else(data_dir)),
        Command::Summary => cmd_summary(&file),
        Command::Numbers {
            position,
            sort,
            search,
        } => cmd_numbers(&file, position, sort, search.as_deref()),
        Command::Number { number } => cmd_number(&file, &number),
        Command::Strategy {
            today,
            window,
            legacy,
            history,
            json,
        } => {
            let mut config = base_config;
            apply_window(&mut config, window, legacy);
            if history.is_some() {
                config.history_limit = history;
            }
            cmd_strategy(&file, today.as_deref(), &config, json)
        }
        Command::Backtest {
            window,
            legacy,
            max_candidates,
            last,
        } => {
            let mut config = base_config;
            apply_window(&mut config, window, legacy);
            if let Some(max_candidates) = max_candidates {
                config.max_candidates = max_candidates;
            }
            cmd_backtest(&file, &config, last)
        }
        Command::Config { output } => cmd_config(&base_config, output.as_deref()),
    }
}

fn apply_window(config: &mut StrategyConfig, window: Option<i64>, legacy: bool) {
    if legacy {
        config.window = LEGACY_WINDOW;
    } else if let Some(window) = window {
        config.window = window;
    }
}

fn cmd_list(dir: &Path) -> Result<()> {
    let files = list_lottery_files(dir)?;
    display_lottery_files(&files);
    Ok(())
}

fn cmd_summary(file: &Path) -> Result<()> {
    let data = load_lottery(file)?;
    display_summary(&data);
    Ok(())
}

fn parse_search(raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| normalize_number(term).with_context(|| format!("Recherche invalide : '{}'", raw)))
        .collect()
}

fn cmd_numbers(file: &Path, position: PositionArg, sort: SortArg, search: Option<&str>) -> Result<()> {
    let terms = match search {
        Some(raw) => parse_search(raw)?,
        None => Vec::new(),
    };
    let data = load_lottery(file)?;
    let rows = number_rows(&data, position.into(), sort.into(), &terms);
    display_number_rows(&rows);
    Ok(())
}

fn cmd_number(file: &Path, number: &str) -> Result<()> {
    let key = normalize_number(number)?;
    let data = load_lottery(file)?;
    match number_detail(&data, &key) {
        Some(detail) => display_number_detail(&detail, chrono::Local::now().date_naive()),
        None => println!("Le numéro {} est absent de {}.", key, data.lottery_name),
    }
    Ok(())
}

fn parse_today(raw: Option<&str>) -> Result<chrono::NaiveDate> {
    match raw {
        Some(raw) => match parse_draw_date(raw) {
            Some(date) => Ok(date),
            None => bail!("Date invalide : '{}' (attendu AAAA-MM-JJ ou JJ-MM-AAAA)", raw),
        },
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn not_applicable(data: &LotteryData) {
    println!(
        "{} : {} positions. La stratégie des 3 numéros ne s'applique qu'aux loteries à 3 positions.",
        data.lottery_name, data.positions_count
    );
}

fn cmd_strategy(file: &Path, today: Option<&str>, config: &StrategyConfig, json: bool) -> Result<()> {
    config.validate()?;
    let today = parse_today(today)?;
    let data = load_lottery(file)?;

    let Some(report) = run_strategy(&data, today, config)? else {
        not_applicable(&data);
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_strategy(&report);
    }
    Ok(())
}

fn cmd_backtest(file: &Path, config: &StrategyConfig, last: usize) -> Result<()> {
    config.validate()?;
    let data = load_lottery(file)?;
    if !data.is_three_position() {
        not_applicable(&data);
        return Ok(());
    }

    let map = build_appearance_map(&data);
    println!("Rejeu de la stratégie ({} numéros, fenêtre {} j)...", map.len(), config.window);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )?
        .progress_chars("=> "),
    );
    let records = run_backtest(&map, config.window, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();

    if records.is_empty() {
        println!("Aucun tirage exploitable dans {}.", file.display());
        return Ok(());
    }

    let summary = summarize(&records, config.max_candidates);
    display_backtest(&summary, &records, last);
    Ok(())
}

fn cmd_config(config: &StrategyConfig, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            config.save(path)?;
            println!("Configuration écrite dans {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_normalizes_terms() {
        assert_eq!(parse_search("5, 17,,").unwrap(), vec!["05".to_string(), "17".to_string()]);
        assert!(parse_search("").unwrap().is_empty());
        assert!(parse_search("5,abc").is_err());
    }

    #[test]
    fn test_parse_today() {
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 1, 28).unwrap();
        assert_eq!(parse_today(Some("2024-01-28")).unwrap(), expected);
        assert_eq!(parse_today(Some("28-01-2024")).unwrap(), expected);
        assert!(parse_today(Some("28/01/2024")).is_err());
    }

    #[test]
    fn test_legacy_flag_sets_window() {
        let mut config = StrategyConfig::default();
        apply_window(&mut config, None, true);
        assert_eq!(config.window, LEGACY_WINDOW);
        apply_window(&mut config, Some(14), false);
        assert_eq!(config.window, 14);
        apply_window(&mut config, None, false);
        assert_eq!(config.window, 14);

        assert!(Cli::try_parse_from(["loteria", "backtest", "--legacy", "--window", "5"]).is_err());
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let mut config = StrategyConfig::default();
        apply_window(&mut config, Some(99_999_999_999), false);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_number_subcommand() {
        let cli = Cli::parse_from(["loteria", "number", "5", "--file", "autre.json"]);
        assert_eq!(cli.file, Some(PathBuf::from("autre.json")));
        assert!(matches!(cli.command, Command::Number { ref number } if number == "5"));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["loteria", "strategy", "--window", "7", "--history", "20"]);
        match cli.command {
            Command::Strategy { window, history, json, .. } => {
                assert_eq!(window, Some(7));
                assert_eq!(history, Some(20));
                assert!(!json);
            }
            _ => panic!("commande inattendue"),
        }
    }
}

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use shopcat_core::config::Config;
use shopcat_core::{
    category_slug, load_products, read_products, BatchReport, CategoryRule, Classifier,
    InputFormat, ProductRecord, RecordCheck, Result, ShopcatError,
};

mod args;
use args::{Cli, Commands, ConfigAction, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let base_dir = match resolve_base_dir(cli.base_dir) {
        Ok(base_dir) => base_dir,
        Err(e) => return report_error(&e),
    };

    let result = match cli.command {
        Some(Commands::Detect {
            name,
            brand,
            explain,
        }) => handle_detect(&base_dir, &name, brand, explain),
        Some(Commands::Slug { name }) => {
            println!("{}", category_slug(&name));
            Ok(())
        }
        Some(Commands::Validate {
            input,
            jsonl,
            json,
            limit,
        }) => handle_validate(&base_dir, &input, jsonl, json, limit),
        Some(Commands::Rules { category }) => handle_rules(&base_dir, category.as_deref()),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn report_error(e: &ShopcatError) -> ExitCode {
    eprintln!("{} {}", "[ERROR]".red().bold(), e);
    ExitCode::from(e.exit_code() as u8)
}

/// `RUST_LOG` wins; otherwise the verbosity flags pick the level.
fn init_tracing(verbose: bool, quiet: bool) {
    let fallback = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "shopcat", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(base) = cli_base {
        return Ok(base);
    }

    if let Ok(base) = std::env::var("SHOPCAT_BASE") {
        return Ok(PathBuf::from(base));
    }

    dirs::home_dir()
        .map(|h| h.join(".shopcat"))
        .ok_or(ShopcatError::HomeNotFound)
}

fn load_classifier(config: &Config) -> Result<Classifier> {
    Ok(Classifier::new(config.rule_set()?))
}

fn handle_detect(
    base_dir: &Path,
    name: &str,
    brand: Option<String>,
    explain: bool,
) -> Result<()> {
    let config = Config::load(base_dir)?;
    let classifier = load_classifier(&config)?;

    let mut product = ProductRecord::named(name);
    if let Some(brand) = brand {
        product = product.with_brand(brand);
    }

    match classifier.best_match(&product) {
        Some(best) => println!("{}", best.category.green().bold()),
        None => println!("{}", "(no match)".dimmed()),
    }

    if explain {
        let candidates = classifier.candidates(&product);
        if candidates.is_empty() {
            return Ok(());
        }

        println!();
        println!("Candidates:");
        for candidate in candidates {
            println!(
                "  {:>4}  {} [{}]",
                candidate.score,
                candidate.category.cyan(),
                candidate.matched_keywords.join(", ")
            );
        }
    }

    Ok(())
}

fn handle_validate(
    base_dir: &Path,
    input: &Path,
    jsonl: bool,
    json: bool,
    limit: usize,
) -> Result<()> {
    let (classifier, products) = load_validation_input(base_dir, input, jsonl)?;
    let report = classifier.batch_validate_products(&products);

    if json {
        let output = json_report(&classifier, &products, &report)?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_report(&classifier, &products, &report, limit);
    Ok(())
}

fn load_validation_input(
    base_dir: &Path,
    input: &Path,
    jsonl: bool,
) -> Result<(Classifier, Vec<ProductRecord>)> {
    let config = Config::load(base_dir)?;
    let classifier = load_classifier(&config)?;
    let aliases = config.field_aliases();

    let products = if input == Path::new("-") {
        let format = if jsonl {
            InputFormat::JsonLines
        } else {
            InputFormat::Json
        };
        read_products(io::stdin().lock(), Path::new("stdin"), format, &aliases)?
    } else if jsonl {
        let file = std::fs::File::open(input).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ShopcatError::InputNotFound {
                path: input.to_path_buf(),
            },
            _ => ShopcatError::Io(e),
        })?;
        read_products(file, input, InputFormat::JsonLines, &aliases)?
    } else {
        load_products(input, &aliases)?
    };
    tracing::info!(count = products.len(), input = %input.display(), "loaded products");

    Ok((classifier, products))
}

/// Report plus one patch per product whose stored category is missing or wrong
fn json_report(
    classifier: &Classifier,
    products: &[ProductRecord],
    report: &BatchReport,
) -> Result<serde_json::Value> {
    let corrections: Vec<serde_json::Value> = products
        .iter()
        .filter_map(|p| {
            classifier.correction(p).map(|patch| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "patch": patch,
                })
            })
        })
        .collect();

    let mut output = serde_json::to_value(report)?;
    if let serde_json::Value::Object(map) = &mut output {
        map.insert(
            "corrections".to_string(),
            serde_json::Value::Array(corrections),
        );
    }
    Ok(output)
}

fn print_report(
    classifier: &Classifier,
    products: &[ProductRecord],
    report: &BatchReport,
    limit: usize,
) {
    let stats = &report.stats;

    println!();
    println!("Products:       {}", stats.total);
    println!("  {:<14}{}", "Correct:", stats.correct.to_string().green());
    println!("  {:<14}{}", "Incorrect:", stats.incorrect.to_string().red());
    println!(
        "  {:<14}{}",
        "Uncategorized:",
        stats.uncategorized.to_string().yellow()
    );
    if let Some(accuracy) = report.accuracy() {
        println!("  {:<14}{:.1}%", "Accuracy:", accuracy * 100.0);
    }

    if !stats.by_category.is_empty() {
        println!();
        println!("Detected categories:");
        for (category, count) in &stats.by_category {
            println!("  {:<20} {}", category.cyan(), count);
        }
    }

    if !report.incorrect_products.is_empty() {
        println!();
        println!("Mismatches:");
        for mismatch in report.incorrect_products.iter().take(limit) {
            println!(
                "  {} {}",
                mismatch.id.as_deref().unwrap_or("-").dimmed(),
                mismatch.name
            );
            println!(
                "    {} -> {}",
                mismatch.current_category.red(),
                mismatch.detected_category.green()
            );
            println!(
                "    patch: category = {:?}, categorySlug = {:?}",
                mismatch.correction.category, mismatch.correction.category_slug
            );
        }
        let hidden = report.incorrect_products.len().saturating_sub(limit);
        if hidden > 0 {
            println!("  ... and {} more (use --limit or --json)", hidden);
        }
    }

    let uncategorized_fixes = products
        .iter()
        .filter(|p| !p.has_category())
        .filter_map(|p| classifier.correction(p))
        .count();
    if uncategorized_fixes > 0 {
        println!();
        println!(
            "{} uncategorized products have a detectable category (patches in --json)",
            uncategorized_fixes.to_string().yellow()
        );
    }
    println!();
}

fn handle_rules(base_dir: &Path, category: Option<&str>) -> Result<()> {
    let config = Config::load(base_dir)?;
    let rules = config.rule_set()?;

    let selected: Vec<&CategoryRule> = match category {
        Some(name) => {
            let matching = rules.get(name);
            if matching.is_empty() {
                return Err(ShopcatError::CategoryNotFound {
                    name: name.to_string(),
                });
            }
            matching
        }
        None => rules.iter().collect(),
    };

    println!();
    for rule in selected {
        println!(
            "  {} (priority {})",
            rule.name().cyan().bold(),
            rule.priority()
        );
        println!("    keywords: {}", rule.keywords().join(", "));
        if !rule.exclude_keywords().is_empty() {
            println!("    excludes: {}", rule.exclude_keywords().join(", "));
        }
        match rule.check() {
            Some(RecordCheck::Tokens {
                require_any,
                forbid,
            }) => {
                if !require_any.is_empty() {
                    println!("    requires: {}", require_any.join(" | "));
                }
                if !forbid.is_empty() {
                    println!("    forbids:  {}", forbid.join(", "));
                }
            }
            Some(RecordCheck::Predicate(_)) => println!("    check:    (custom)"),
            None => {}
        }
        println!();
    }

    let duplicates = rules.duplicate_names();
    if !duplicates.is_empty() && category.is_none() {
        println!(
            "Declared more than once ({}): {}",
            config.classifier.duplicates.as_str(),
            duplicates.join(", ")
        );
        println!();
    }

    Ok(())
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(ShopcatError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            if !config.rules.is_empty() {
                println!("{} = {}", "rules".cyan(), config.rules.len());
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_dir_prefers_flag() {
        let base = resolve_base_dir(Some(PathBuf::from("/tmp/shopcat"))).unwrap();
        assert_eq!(base, PathBuf::from("/tmp/shopcat"));
    }

    #[test]
    fn test_load_classifier_uses_config_rules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
            [classifier]
            builtin = false

            [[rules]]
            name = "Capture Cards"
            keywords = ["capture card"]
            "#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        let classifier = load_classifier(&config).unwrap();
        assert_eq!(classifier.rules().len(), 1);
        assert_eq!(
            classifier.detect_category(&ProductRecord::named("4K Capture Card")),
            Some("Capture Cards")
        );
    }

    #[test]
    fn test_validate_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = handle_validate(dir.path(), &missing, false, true, 10).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = handle_validate(dir.path(), &missing, true, true, 10).unwrap_err();
        assert!(matches!(err, ShopcatError::InputNotFound { .. }));
    }

    #[test]
    fn test_validate_envelope_reports_patches() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("products.json");
        std::fs::write(
            &input,
            r#"{"items": [
                {"_id": "1", "name": "Logitech G502 Wireless Mouse", "category": "Keyboards"},
                {"_id": "2", "name": "Samsung 980 Pro 1TB NVMe SSD"},
                {"_id": "3", "name": "Dell UltraSharp 27 Monitor", "category": "Monitors"}
            ], "total": 3}"#,
        )
        .unwrap();

        let (classifier, products) = load_validation_input(dir.path(), &input, false).unwrap();
        let report = classifier.batch_validate_products(&products);
        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.incorrect, 1);
        assert_eq!(report.incorrect_products[0].correction.category, "Mice");
        assert_eq!(report.incorrect_products[0].correction.category_slug, "mice");

        let output = json_report(&classifier, &products, &report).unwrap();
        assert_eq!(
            output["incorrectProducts"][0]["correction"]["categorySlug"],
            "mice"
        );
        let corrections = output["corrections"].as_array().unwrap();
        assert_eq!(corrections.len(), 2);
        assert_eq!(corrections[0]["id"], "1");
        assert_eq!(corrections[0]["patch"]["category"], "Mice");
        assert_eq!(corrections[1]["id"], "2");
        assert_eq!(corrections[1]["patch"]["categorySlug"], "storage");

        handle_validate(dir.path(), &input, false, false, 5).unwrap();
    }

    #[test]
    fn test_rules_unknown_category() {
        let dir = tempfile::tempdir().unwrap();
        let err = handle_rules(dir.path(), Some("Nonexistent")).unwrap_err();
        assert!(matches!(err, ShopcatError::CategoryNotFound { .. }));

        handle_rules(dir.path(), Some("RAM")).unwrap();
        handle_rules(dir.path(), None).unwrap();
    }
}

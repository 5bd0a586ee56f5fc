//! Kitchen Costing
//!
//! Command-line front end for recipe costing, pricing, scaling and
//! ingredient availability checks over a directory of CSV exports.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kitchen_costing::availability::MISSING_INGREDIENTS_FILE;
use kitchen_costing::costing_config::CostingConfig;
use kitchen_costing::costing_service::{CostingService, Outcome};
use kitchen_costing::loader::load_kitchen_data;
use kitchen_costing::localization::LocalizationManager;
use kitchen_costing::pricing::{PriceEdit, PricingBook, PRICING_FILE};
use kitchen_costing::report;
use kitchen_costing::units::convert;

#[derive(Parser)]
#[command(name = "kitchen-costing")]
#[command(about = "Recipe cost, pricing and availability calculator")]
struct Cli {
    /// Directory holding the CSV tables and the pricing book
    #[arg(long, env = "KITCHEN_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Directory holding the JSON settings files
    #[arg(long, env = "KITCHEN_CONFIG_DIR", default_value = "config", global = true)]
    config_dir: PathBuf,

    /// Output language (en, fr)
    #[arg(long, default_value = "en", global = true)]
    lang: String,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cost breakdown of a recipe
    Cost {
        /// Recipe id
        recipe_id: i64,
    },

    /// Show cost, selling price and profit of a recipe
    Price {
        /// Recipe id
        recipe_id: i64,
    },

    /// Cost a batch of several units
    Scale {
        /// Recipe id
        recipe_id: i64,

        /// Number of units in the batch
        #[arg(short, long, default_value = "1.0")]
        factor: f64,
    },

    /// Check ingredient availability
    Validate {
        /// Check a single recipe instead of all of them
        #[arg(long)]
        recipe: Option<i64>,

        /// Write the missing-ingredients report
        #[arg(long)]
        write: bool,
    },

    /// Set the selling and competitor price of a recipe
    SetPrice {
        /// Recipe name as it appears in the recipes table
        recipe_name: String,

        /// Our selling price
        #[arg(long)]
        ours: Option<f64>,

        /// Competitor price
        #[arg(long)]
        others: Option<f64>,

        /// Remove the stored selling price
        #[arg(long, conflicts_with = "ours")]
        clear_ours: bool,

        /// Remove the stored competitor price
        #[arg(long, conflicts_with = "others")]
        clear_others: bool,
    },

    /// Cost and price every recipe
    Summary,

    /// Convert a quantity between units
    Convert {
        quantity: f64,
        from: String,
        to: String,
    },
}

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an outcome as text or JSON; returns whether it was ready
fn print_outcome<T: Serialize>(
    cli: &Cli,
    outcome: &Outcome<T>,
    recipe_label: &str,
    l10n: &LocalizationManager,
    render: impl Fn(&T, &LocalizationManager) -> String,
) -> Result<bool> {
    if cli.json {
        print_json(outcome)?;
    } else {
        print!("{}", report::format_outcome(outcome, recipe_label, l10n, render));
    }
    Ok(outcome.is_ready())
}

fn persistence_failure(l10n: &LocalizationManager, path: &Path, error: &dyn std::fmt::Display) {
    error!("Failed to save {}: {}", path.display(), error);
    eprintln!(
        "{}",
        l10n.get_message_with_args(
            "persistence-failed",
            &[
                ("path", &path.display().to_string()),
                ("reason", &error.to_string()),
            ],
        )
    );
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let l10n = LocalizationManager::new()?.with_language(&cli.lang);

    if let Commands::Convert {
        quantity,
        from,
        to,
    } = &cli.command
    {
        let result = convert(*quantity, from, to);
        println!(
            "{}",
            l10n.get_message_with_args(
                "convert-result",
                &[
                    ("quantity", &quantity.to_string()),
                    ("from", from),
                    ("result", &format!("{:.4}", result)),
                    ("to", to),
                ],
            )
        );
        return Ok(ExitCode::SUCCESS);
    }

    let data = load_kitchen_data(&cli.data_dir)?;
    let config = CostingConfig::load(&cli.config_dir);
    let pricing_path = cli.data_dir.join(PRICING_FILE);
    let mut book = PricingBook::load(&pricing_path)?;
    let service = CostingService::new(&data, &config);

    let ok = match &cli.command {
        Commands::Cost { recipe_id } => print_outcome(
            cli,
            &service.cost(*recipe_id),
            &recipe_id.to_string(),
            &l10n,
            report::format_breakdown,
        )?,

        Commands::Price { recipe_id } => print_outcome(
            cli,
            &service.price(*recipe_id, &book),
            &recipe_id.to_string(),
            &l10n,
            report::format_priced_recipe,
        )?,

        Commands::Scale { recipe_id, factor } => print_outcome(
            cli,
            &service.scale(*recipe_id, *factor),
            &recipe_id.to_string(),
            &l10n,
            report::format_scaled,
        )?,

        Commands::Validate {
            recipe: Some(recipe_id),
            ..
        } => print_outcome(
            cli,
            &service.validate(*recipe_id),
            &recipe_id.to_string(),
            &l10n,
            report::format_availability,
        )?,

        Commands::Validate {
            recipe: None,
            write,
        } => {
            let scan = service.scan_missing_ingredients();
            if cli.json {
                print_json(&scan)?;
            } else {
                print!("{}", report::format_scan(&scan, &l10n));
            }

            if *write {
                let path = cli.data_dir.join(MISSING_INGREDIENTS_FILE);
                match scan.save(&path) {
                    Ok(()) => println!(
                        "{}",
                        l10n.get_message_with_args(
                            "report-saved",
                            &[("path", &path.display().to_string())],
                        )
                    ),
                    Err(e) => {
                        persistence_failure(&l10n, &path, &e);
                        return Ok(ExitCode::from(2));
                    }
                }
            }
            true
        }

        Commands::SetPrice {
            recipe_name,
            ours,
            others,
            clear_ours,
            clear_others,
        } => {
            book.edit(
                recipe_name,
                PriceEdit::from_flags(*ours, *clear_ours),
                PriceEdit::from_flags(*others, *clear_others),
            );

            if let Some(recipe) = data.recipe_by_name(recipe_name) {
                book.annotate(
                    recipe_name,
                    Some(recipe.prep_minutes() + recipe.cook_minutes()),
                    config.policy.other_charges,
                );
            }

            if let Err(e) = book.save(&pricing_path) {
                persistence_failure(&l10n, &pricing_path, &e);
                return Ok(ExitCode::from(2));
            }
            info!("Pricing updated for '{}'", recipe_name);
            println!(
                "{}",
                l10n.get_message_with_args("pricing-saved", &[("recipe", recipe_name)])
            );
            true
        }

        Commands::Summary => {
            let summary = service.summarize(&book);
            if cli.json {
                print_json(&summary)?;
            } else {
                print!("{}", report::format_summary(&summary, &l10n));
            }
            true
        }

        Commands::Convert { .. } => true,
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    info!("Starting kitchen-costing");

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

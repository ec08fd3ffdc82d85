use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use clearskin::commands::{analyzer, history, prefs, products, AppContext};
use clearskin::config::AppConfig;
use clearskin::prefs::{BudgetTier, PainPoint, PrefsUpdate};
use clearskin::ClearSkinError;

#[derive(Parser)]
#[command(name = "clearskin")]
#[command(about = "AI skin analysis with history and progress tracking", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/clearskin/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a facial photo and store the result
    Analyze { photo: PathBuf },
    /// List stored analyses, newest first
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one analysis, or the latest when no id is given
    Show { id: Option<String> },
    /// Compare two analyses, or the oldest and newest in history
    Compare {
        #[arg(requires = "followup")]
        baseline: Option<String>,
        followup: Option<String>,
    },
    /// Show or update onboarding preferences
    Prefs {
        #[arg(long)]
        concern: Option<PainPoint>,
        #[arg(long)]
        budget: Option<BudgetTier>,
    },
    /// Mark onboarding as completed
    Onboard,
    /// Recommend products for the stored preferences
    Products {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete all local analyses and preferences
    Reset,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clearskin::init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let ctx = AppContext::open(config).context("failed to open local data")?;

    match cli.command {
        Commands::Analyze { photo } => {
            let view = analyzer::analyze_photo(&ctx, &photo).await.map_err(|e| {
                if let ClearSkinError::Analysis(ref err) = e {
                    eprintln!("{}", err.user_message());
                }
                e
            })?;
            print_json(&view)?;
        }
        Commands::History { limit } => {
            print_json(&history::list_history(&ctx, limit).await?)?;
        }
        Commands::Show { id } => match id {
            Some(id) => print_json(&history::get_analysis(&ctx, &id).await?)?,
            None => match history::last_analysis(&ctx).await? {
                Some(view) => print_json(&view)?,
                None => println!("No analyses yet."),
            },
        },
        Commands::Compare { baseline, followup } => match (baseline, followup) {
            (Some(a), Some(b)) => print_json(&history::compare_pair(&ctx, &a, &b).await?)?,
            _ => match history::compare_progress(&ctx).await? {
                Some(progress) => print_json(&progress)?,
                None => println!("At least two analyses are needed to compare progress."),
            },
        },
        Commands::Prefs { concern, budget } => {
            let state = if concern.is_some() || budget.is_some() {
                let update = PrefsUpdate {
                    main_concern: concern,
                    budget,
                };
                prefs::set_prefs(&ctx, update).await?
            } else {
                prefs::get_app_state(&ctx).await?
            };
            print_json(&state)?;
        }
        Commands::Onboard => {
            print_json(&prefs::complete_onboarding(&ctx).await?)?;
        }
        Commands::Products { limit } => {
            print_json(&products::recommend_products(&ctx, limit).await?)?;
        }
        Commands::Reset => {
            prefs::reset(&ctx).await?;
            println!("Local data cleared.");
        }
    }

    Ok(())
}

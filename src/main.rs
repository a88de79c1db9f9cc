use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use voice_bot::{init_tracing, Config, KnowledgeStore, QueryProcessor, SqliteStore};

#[derive(Parser)]
#[command(name = "voice-bot", version, about = "Voice bot backend: setup, import and offline queries")]
struct Cli {
    /// Path to a TOML config file (defaults to ./voice-bot.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema and seed demo data into empty tables
    Init {
        /// Only create the schema
        #[arg(long)]
        no_seed: bool,
    },
    /// Import accounts from a CSV (username,account_number,balance)
    ImportAccounts { csv: PathBuf },
    /// Import FAQs from a CSV (question,keywords,answer)
    ImportFaqs { csv: PathBuf },
    /// Answer a query and print the JSON response
    Ask {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print FAQ and account counts
    Stats,
    /// List stored FAQs
    Faqs,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let store = SqliteStore::open(&config.database.path)?;
    store.setup()?;

    match cli.command {
        Command::Init { no_seed } => {
            if !no_seed {
                let report = store.seed_demo_data()?;
                println!(
                    "✓ Seeded {} accounts and {} FAQs",
                    report.accounts, report.faqs
                );
            }
            println!("✓ Database ready: {}", config.database.path.display());
        }
        Command::ImportAccounts { csv } => {
            let imported = store.import_accounts_csv(&csv)?;
            println!("✓ Imported {} accounts from {}", imported, csv.display());
        }
        Command::ImportFaqs { csv } => {
            let imported = store.import_faqs_csv(&csv)?;
            println!("✓ Imported {} FAQs from {}", imported, csv.display());
        }
        Command::Ask { text } => {
            let text = text.join(" ");
            let processor = QueryProcessor::new(Arc::new(store))
                .with_default_username(config.bot.default_username.clone());

            let response = processor.process(&text)?;
            info!(intent = %response.intent, "answered query");
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Stats => {
            println!("{}", serde_json::to_string_pretty(&store.stats()?)?);
        }
        Command::Faqs => {
            for faq in store.list_faqs()? {
                println!(
                    "#{:<3} {:<40} [{}]",
                    faq.id,
                    faq.question.as_deref().unwrap_or("-"),
                    faq.keywords
                );
            }
        }
    }

    Ok(())
}

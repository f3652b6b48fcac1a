use anyhow::Result;
use clap::Parser;
use log::{error, info};

mod classifier;
mod config;
mod extractor;
mod gmail_client;
mod processor;

use config::Config;
use processor::TriageProcessor;

#[derive(Parser)]
#[command(name = "mailsweep")]
#[command(about = "Classifies unread Gmail messages and moves spam to the trash")]
#[command(version = "0.1.0")]
struct Args {
    /// Dry-run mode: classify messages without moving anything to the trash
    #[arg(short, long)]
    dry_run: bool,

    /// Limit the number of messages processed (default: unlimited)
    #[arg(short = 'l', long)]
    limit: Option<usize>,

    /// Check the configuration without connecting
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger le fichier .env s'il existe
    dotenv::dotenv().ok();

    let args = Args::parse();

    env_logger::init();

    if args.dry_run {
        info!("🧪 Starting mailsweep in DRY-RUN mode");
    } else {
        info!("🚀 Starting mailsweep");
    }

    let config = Config::new()?;

    if args.check_config {
        println!("✅ Configuration valide !");
        println!("📧 Gmail API OAuth2");
        println!("🔑 Credentials: {}", config.gmail.credentials_path);
        println!("💾 Token cache: {}", config.gmail.token_cache_path);
        println!("📬 Max results: {}", config.max_results);
        return Ok(());
    }

    let processor = TriageProcessor::new(config);

    match processor.run(args.dry_run, args.limit).await {
        Ok(summary) => {
            if args.dry_run {
                info!(
                    "✅ Dry-run finished. {} message(s) analyzed, {} flagged as spam.",
                    summary.processed, summary.spam
                );
            } else {
                info!(
                    "✅ Triage finished. {} message(s) processed, {} moved to trash.",
                    summary.processed, summary.trashed
                );
            }
        }
        Err(e) => {
            error!("❌ Error during triage: {}", e);
            return Err(e);
        }
    }

    Ok(())
}

mod clean;
mod html_text;
mod scrape;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reader_core::{load_corpus, save_corpus};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::scrape::{ScrapeOptions, Scraper};

#[derive(Parser)]
#[command(name = "reader-tools")]
#[command(about = "Build and clean the story corpus")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch graded-reader stories into a JSON corpus
    Scrape {
        #[arg(long, default_value = "stories_bulk.json")]
        out: PathBuf,

        /// Pause between story pages, in milliseconds
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,

        /// Index pages to collect story links from (defaults to HSK 1 and 2)
        #[arg(long = "index", num_args = 1..)]
        index_urls: Vec<String>,
    },
    /// Strip non-Chinese lines from a corpus in place
    Clean {
        #[arg(long, default_value = "stories_bulk.json")]
        corpus: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Args::parse().command {
        Command::Scrape {
            out,
            delay_ms,
            index_urls,
        } => {
            let mut options = ScrapeOptions {
                delay: Duration::from_millis(delay_ms),
                ..ScrapeOptions::default()
            };
            if !index_urls.is_empty() {
                options.index_urls = index_urls;
            }
            let stories = Scraper::new(options)?.run();
            save_corpus(&out, &stories)?;
            println!("Saved {} stories to {}", stories.len(), out.display());
        }
        Command::Clean { corpus } => {
            let raw = load_corpus(&corpus)
                .with_context(|| format!("cleaning {}", corpus.display()))?;
            let report = clean::clean_corpus(&raw);
            println!(
                "Cleaned: {} stories (skipped {} too short)",
                report.stories.len(),
                report.skipped
            );
            save_corpus(&corpus, &report.stories)?;

            for story in report.stories.iter().take(3) {
                let preview: String = story.content.chars().take(150).collect();
                println!("\n--- {} ---\n{}...", story.title, preview);
            }
            println!("\nSaved {} stories", report.stories.len());
        }
    }
    Ok(())
}

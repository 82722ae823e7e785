use anyhow::{Context, Result};
use chinese_reader::{ReaderConfig, Site};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use reader_core::{segment, Vocabulary};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chinese-reader")]
#[command(about = "Generate vocabulary-annotated Chinese reading pages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding hsk{level}.csv and extra_vocab.csv
    #[arg(long, global = true)]
    vocab_dir: Option<PathBuf>,

    /// HSK level used as the known vocabulary
    #[arg(long, global = true)]
    level: Option<u8>,

    /// Output directory for the generated pages
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// JSON story corpus (defaults to the bundled stories)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Article date for `generate`, YYYY-MM-DD (defaults to today)
    #[arg(long, global = true)]
    date: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the article for a date and refresh the site (default)
    Generate,
    /// Print the annotation of a piece of text
    Segment {
        text: String,
    },
    /// Compile both vocabulary tables into bincode caches
    CompileVocab {
        /// Directory the .bin files are written to (defaults to the
        /// vocabulary directory, where they are picked up automatically)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
}

impl Cli {
    fn reader_config(&self) -> Result<ReaderConfig> {
        let mut config = match &self.config {
            Some(path) => ReaderConfig::load_toml(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ReaderConfig::default(),
        };
        if let Some(dir) = &self.vocab_dir {
            config.base_mut().vocab_dir = dir.clone();
        }
        if let Some(level) = self.level {
            config.base_mut().hsk_level = level;
        }
        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        if let Some(corpus) = &self.corpus {
            config.corpus = Some(corpus.clone());
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.reader_config()?;

    match cli.command {
        None | Some(Commands::Generate) => generate(config, cli.date.as_deref()),
        Some(Commands::Segment { text }) => {
            let (known, extra) = config.base().load_vocabularies()?;
            let seg = segment(&text, &known, &extra);
            for span in &seg.spans {
                if span.is_passthrough() {
                    continue;
                }
                println!(
                    "{}\t{:?}\t{}\t{}",
                    span.text, span.source, span.pronunciation, span.gloss
                );
            }
            if !seg.unknown.is_empty() {
                println!("unknown: {}", seg.unknown);
            }
            Ok(())
        }
        Some(Commands::CompileVocab { dest }) => {
            let base = config.base();
            let known = Vocabulary::load_csv_or_empty(base.known_vocab_path())?;
            let extra = Vocabulary::load_csv_or_empty(base.extra_vocab_path())?;
            let (known_path, extra_path) = match &dest {
                Some(dir) => {
                    let file_name = |p: PathBuf| p.file_name().map(|n| dir.join(n));
                    (
                        file_name(base.known_cache_path()).context("known cache path")?,
                        file_name(base.extra_cache_path()).context("extra cache path")?,
                    )
                }
                None => (base.known_cache_path(), base.extra_cache_path()),
            };
            if let Some(dir) = known_path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            known.save_bincode(&known_path)?;
            extra.save_bincode(&extra_path)?;
            println!(
                "Wrote {} ({} terms) and {} ({} terms)",
                known_path.display(),
                known.len(),
                extra_path.display(),
                extra.len()
            );
            Ok(())
        }
    }
}

fn generate(config: ReaderConfig, date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date {s:?}, expected YYYY-MM-DD"))?,
        None => Local::now().date_naive(),
    };
    let site = Site::load(config)?;
    let report = site.generate(date)?;

    println!("Generated: {}", report.title);
    println!(
        "Stats: {}/{} words are HSK {} vocab",
        report.stats.known_words,
        report.stats.chinese_words,
        site.config().base().hsk_level
    );
    println!("Articles: {}", report.articles);
    Ok(())
}

mod dates;
mod error;
mod mapper;
mod output;
mod pipeline;
mod settings;
mod source;
mod template;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use mapper::Variant;
use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "microfilm_migrate",
    about = "Convert the microfilm inventory XML export into accession CSV rows"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathArgs {
    /// Access XML export
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// CSV whose header row defines the output columns
    #[arg(short, long)]
    template: Option<PathBuf>,
    /// Mapping rule set
    #[arg(short, long, value_enum)]
    variant: Option<Variant>,
}

#[derive(Subcommand)]
enum Commands {
    /// Map every microfilm record and write the accession CSV
    Run {
        #[command(flatten)]
        paths: PathArgs,
        /// Output CSV (default depends on the variant)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show mapped rows without writing anything
    Preview {
        #[command(flatten)]
        paths: PathArgs,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Count records per ACCESSNUM code
    Stats {
        /// Access XML export
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let base = Settings::load()?;

    let result = match cli.command {
        Commands::Run { paths, output } => {
            let settings = base.apply(overrides(paths, output));
            let summary = pipeline::run(&settings)?;
            summary.print();
            Ok(())
        }
        Commands::Preview { paths, limit } => {
            let settings = base.apply(overrides(paths, None));
            let rows = pipeline::preview(&settings)?;
            if rows.is_empty() {
                println!("No microfilm records found.");
                return Ok(());
            }
            for (i, row) in rows.iter().take(limit).enumerate() {
                println!("--- row {} ---", i + 1);
                for (column, value) in row.non_empty() {
                    println!("  {:<36} {}", column, truncate(value, 60));
                }
            }
            println!("\n{} rows ({} shown)", rows.len(), rows.len().min(limit));
            Ok(())
        }
        Commands::Stats { input } => {
            let settings = base.apply(Overrides {
                input,
                ..Default::default()
            });
            let records = source::read_records(&settings.input)?;
            let stats = pipeline::source_stats(&records);
            println!("Records:   {}", stats.total);
            println!("Microfilm: {}", stats.eligible);
            println!("Skipped:   {}", stats.total - stats.eligible);
            println!("\n{:<12} | {:>6}", "ACCESSNUM", "Count");
            println!("{}", "-".repeat(21));
            for (code, n) in &stats.codes {
                let code = if code.is_empty() { "(blank)" } else { code.as_str() };
                println!("{:<12} | {:>6}", code, n);
            }
            println!("\n{:<16} | {:>6}", "Field", "Present");
            println!("{}", "-".repeat(26));
            for (name, n) in &stats.fields {
                println!("{:<16} | {:>6}", name, n);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn overrides(paths: PathArgs, output: Option<PathBuf>) -> Overrides {
    Overrides {
        input: paths.input,
        template: paths.template,
        output,
        variant: paths.variant,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

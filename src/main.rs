use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gradebook::db::{self, PgGradeSource};
use gradebook::{report, GradeSource, Gradebook, GradebookConfig};

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(about = "Weighted gradebook averages and class statistics for Group Scholar", long_about = None)]
struct Cli {
    /// JSON file with the grade scale and default category weights
    #[arg(long, global = true, env = "GRADEBOOK_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a sample class
    Seed,
    /// Import scores from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show weighted averages for a class
    Average {
        #[arg(long)]
        class: String,
        /// Only show the student with this email
        #[arg(long)]
        email: Option<String>,
    },
    /// Show class statistics
    Stats {
        #[arg(long)]
        class: String,
        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        class: String,
        #[arg(long, default_value = "gradebook.md")]
        out: PathBuf,
    },
    /// Validate and print the active grade scale
    Scale,
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = GradebookConfig::load(cli.config.as_deref())?;
    let gradebook = Gradebook::from_config(&config)?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&connect().await?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&connect().await?).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let summary = db::import_csv(&connect().await?, &csv, &config).await?;
            println!("Stored {} scores from {}.", summary.stored, csv.display());
            for rejected in &summary.rejected {
                println!("- rejected line {}: {}", rejected.line, rejected.reason);
            }
        }
        Commands::Average { class, email } => {
            let source = PgGradeSource::new(connect().await?);
            let snapshot = source.fetch_class(&class).await?;
            let class_gradebook = gradebook.class_report(&snapshot);

            let results: Vec<_> = report::ranked(&class_gradebook.results)
                .into_iter()
                .filter(|result| email.as_deref().map_or(true, |e| result.student.email == e))
                .collect();
            if results.is_empty() {
                println!("No students found for {class}.");
                return Ok(());
            }

            println!("Weighted averages for {class}:");
            for result in results {
                let average = &result.average;
                println!(
                    "- {} ({}) {:.2}% {} (GPA {:.1}) across {} graded assignments",
                    result.student.name,
                    result.student.email,
                    average.percentage,
                    average.letter_grade,
                    average.gpa,
                    average.graded_count
                );
            }
        }
        Commands::Stats { class, json } => {
            let source = PgGradeSource::new(connect().await?);
            let snapshot = source.fetch_class(&class).await?;
            let stats = gradebook.class_report(&snapshot).statistics;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }
            if stats.total_students == 0 {
                println!("No students enrolled in {class}.");
                return Ok(());
            }

            println!(
                "{class}: {} students, average {:.2}%, highest {:.2}%, lowest {:.2}%",
                stats.total_students, stats.class_average, stats.highest, stats.lowest
            );
            for bucket in &stats.distribution {
                println!("- {}: {}", bucket.letter, bucket.count);
            }
        }
        Commands::Report { class, out } => {
            let source = PgGradeSource::new(connect().await?);
            let snapshot = source.fetch_class(&class).await?;
            let class_gradebook = gradebook.class_report(&snapshot);
            let report = report::build_report(
                &class_gradebook,
                gradebook.scale(),
                chrono::Utc::now().date_naive(),
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Scale => {
            for band in gradebook.scale().bands() {
                println!(
                    "- {}: {:.0}-{:.0} (GPA {:.1}){}",
                    band.letter,
                    band.min,
                    band.max,
                    band.gpa,
                    band.color.as_deref().map(|c| format!(" {c}")).unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

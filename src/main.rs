use anyhow::Result;
use api_sign::compat::{Changelog, ChangelogConfig, ChangelogEngine};
use api_sign::spec::{Compatibility, Spec};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "api-sign")]
#[command(about = "Detect and classify changes between two versions of an API description")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    #[command(about = "Compare two API descriptions and print the changelog")]
    Compare {
        #[arg(help = "Path to the old description (.proto, .json, .yaml)")]
        old_file: PathBuf,
        #[arg(help = "Path to the new description (.proto, .json, .yaml)")]
        new_file: PathBuf,
        #[arg(long, help = "Output format", value_enum, default_value = "text")]
        format: OutputFormat,
        #[arg(long, help = "Path to a YAML configuration file")]
        config: Option<PathBuf>,
        #[arg(long, help = "Exit with status 1 when breaking changes are found")]
        fail_on_breaking: bool,
    },
    #[command(about = "Generate semantic fingerprint for an API description")]
    Fingerprint {
        #[arg(help = "Path to the description (.proto, .json, .yaml)")]
        file: PathBuf,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Text,
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    match args.command {
        Commands::Compare {
            old_file,
            new_file,
            format,
            config,
            fail_on_breaking,
        } => {
            let config = match config {
                Some(path) => ChangelogConfig::from_yaml_file(path)?,
                None => ChangelogConfig::default(),
            };
            let fail_on_breaking = fail_on_breaking || config.fail_on_breaking;
            let engine = ChangelogEngine::new(config);

            let old_spec = Spec::from_path(&old_file)?;
            let new_spec = Spec::from_path(&new_file)?;
            let changelog = old_spec.changelog(&new_spec, &engine)?;

            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&changelog)?;
                    println!("{}", json);
                }
                OutputFormat::Text => print_text(&changelog),
            }

            if fail_on_breaking && changelog.has_breaking_changes() {
                std::process::exit(1);
            }
        }
        Commands::Fingerprint { file } => {
            let spec = Spec::from_path(&file)?;
            println!("{}", spec.fingerprint);
        }
    }

    Ok(())
}

fn print_text(changelog: &Changelog) {
    let headline = match Compatibility::of(changelog) {
        Compatibility::Green => "Green: no changes detected",
        Compatibility::Yellow => "Yellow: new description is backward-compatible",
        Compatibility::Red => "Red: breaking change detected",
    };
    println!("{headline}");
    println!(
        "{} {} -> {}",
        changelog.api_name, changelog.from_version, changelog.to_version
    );

    if changelog.is_empty() {
        println!("No changes detected.");
        return;
    }

    println!();
    for change in &changelog.changes {
        println!(
            "  [{}] {} {} {}",
            change.severity(),
            change.change_type(),
            change.category(),
            change.path()
        );
        println!("    {}", change.description());
    }
    for breaking in &changelog.breaking_changes {
        if let Some(suggestion) = breaking.migration_suggestion() {
            println!();
            println!("  Migration for {}: {}", breaking.change().path(), suggestion);
        }
    }

    let risk = &changelog.risk_assessment;
    println!();
    println!("Summary:");
    println!("  Total changes: {}", changelog.summary.total_changes);
    println!("  Breaking changes: {}", changelog.summary.breaking_changes);
    println!("  Risk: {} ({}/100)", risk.level, risk.overall_score);
    println!("  Recommended version bump: {}", risk.semver_recommendation);
    println!("  {}", risk.recommendation);
}

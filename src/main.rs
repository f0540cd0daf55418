//! Event calendar feature CLI
//!
//! Turns a delimited event schedule into a calendar feature matrix.

use clap::{Parser, Subcommand};
use event_features::{Config, Result};

#[derive(Parser)]
#[command(name = "event-features")]
#[command(about = "Calendar feature extraction for scheduled events", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the feature matrix of a resource
    Extract {
        /// Resource name, resolved to <resource_dir>/<NAME>.<extension>
        name: String,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show the label table
    Labels,
    /// List the holidays of the configured region for a year
    Holidays {
        year: i32,
    },
    /// Write a default config file
    Init,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        log::debug!("No config at {}, using defaults", cli.config);
        Config::default()
    };

    let result = match cli.command {
        Commands::Extract {
            name,
            format,
            output,
        } => commands::extract(&config, &name, format, output),
        Commands::Labels => commands::labels(&config),
        Commands::Holidays { year } => commands::holidays(&config, year),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use event_features::calendar::{self, Region};
    use event_features::export;
    use std::fs::File;
    use std::io::{self, BufWriter, Write};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all(&config.data.resource_dir)?;
        println!("Created {}/ directory", config.data.resource_dir);

        println!("\nNext steps:");
        println!("  1. Edit {} to customize labels and holiday region", config_path);
        println!(
            "  2. Put a schedule at {}",
            config.data.resource_path("<name>").display()
        );
        println!("  3. Run 'event-features extract <name> --format csv -o features.csv'");

        Ok(())
    }

    pub fn extract(
        config: &Config,
        name: &str,
        format: OutputFormat,
        output: Option<String>,
    ) -> Result<()> {
        let matrix = event_features::extract_from_resource(config, name)?;

        let writer: Box<dyn Write> = match &output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(io::stdout().lock()),
        };

        match format {
            OutputFormat::Table => {
                let mut writer = writer;
                write!(writer, "{}", export::format_summary(&matrix, 20))?;
                writer.flush()?;
            }
            OutputFormat::Json => export::write_json(&matrix, writer)?,
            OutputFormat::Csv => export::write_csv(&matrix, writer)?,
        }

        if let Some(path) = output {
            log::info!("Wrote {} rows to {}", matrix.n_records(), path);
        }

        Ok(())
    }

    pub fn labels(config: &Config) -> Result<()> {
        println!("Label Table");
        println!("───────────────────────────────");
        for (label, code) in config.labels.iter() {
            println!("  {:>3}  {}", code.0, label);
        }
        Ok(())
    }

    pub fn holidays(config: &Config, year: i32) -> Result<()> {
        let region = Region::parse(&config.holidays.region)?;
        let table = calendar::for_region(&region, [year])?;

        println!("Holidays {} ({})", year, region);
        println!("───────────────────────────────");
        for (date, name) in table.in_year(year) {
            println!("  {}  {:<3}  {}", date, date.format("%a"), name);
        }
        Ok(())
    }
}

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use modcore_trust::config::Config;
use modcore_trust::engine::{Preset, RiskCategory};
use modcore_trust::error::TrustError;
use modcore_trust::output::{self, OutputFormat};
use modcore_trust::sandbox::Sandbox;
use modcore_trust::source::{manifest, ExtensionRecord, StaticSource};
use modcore_trust::{ScanOptions, CONFIG_FILE_NAME};

#[derive(Parser)]
#[command(
    name = "modcore-trust",
    about = "Permission risk scoring for browser extensions",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ReportArgs {
    /// Config file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Engine preset (trustguard, safety_center)
    #[arg(long, short = 'p')]
    preset: Option<String>,

    /// Output format (console, json)
    #[arg(long, short = 'f', default_value = "console")]
    format: String,

    /// Category that fails the run (excellent, good, moderate, concerning, high_risk)
    #[arg(long)]
    fail_on: Option<String>,

    /// Write output to file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an explicit permission list
    Score {
        /// Permission identifiers, e.g. storage "<all_urls>" webRequest
        #[arg(required = true)]
        permissions: Vec<String>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Find extension manifests below a path and score each
    Scan {
        /// Directory containing unpacked extensions, or a manifest.json
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Show how the score changes with some permissions removed
    WhatIf {
        /// Extension directory or manifest.json
        manifest: PathBuf,

        /// Permissions to switch off
        #[arg(long, short = 'd', value_delimiter = ',')]
        disable: Vec<String>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// List every permission in the registry
    ListPermissions {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .modcore-trust.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            permissions,
            report,
        } => cmd_score(permissions, report),
        Commands::Scan { path, report } => cmd_scan(path, report),
        Commands::WhatIf {
            manifest,
            disable,
            report,
        } => cmd_what_if(manifest, disable, report),
        Commands::ListPermissions { format } => cmd_list_permissions(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

impl ReportArgs {
    fn format(&self) -> OutputFormat {
        OutputFormat::from_str_lenient(&self.format).unwrap_or_else(|| {
            eprintln!("Warning: unknown format '{}', using console", self.format);
            OutputFormat::Console
        })
    }

    fn options(&self) -> ScanOptions {
        let preset = self.preset.as_deref().and_then(|s| {
            let preset = Preset::from_str_lenient(s);
            if preset.is_none() {
                eprintln!("Warning: unknown preset '{}', using config default", s);
            }
            preset
        });
        let fail_on = self.fail_on.as_deref().and_then(|s| {
            let category = RiskCategory::from_str_lenient(s);
            if category.is_none() {
                eprintln!("Warning: unknown category '{}', using config default", s);
            }
            category
        });

        ScanOptions {
            config_path: self.config.clone(),
            format: self.format(),
            preset_override: preset,
            fail_on_override: fail_on,
        }
    }

    fn emit(&self, rendered: &str) -> Result<(), TrustError> {
        match &self.output {
            Some(out) => std::fs::write(out, rendered)?,
            None => print!("{}", rendered),
        }
        Ok(())
    }
}

fn cmd_score(permissions: Vec<String>, args: ReportArgs) -> Result<i32, TrustError> {
    let options = args.options();
    let config = options.resolve_config(Path::new("."))?;
    let source = StaticSource::new(vec![ExtensionRecord::from_permissions(
        "(command line)",
        permissions,
    )]);

    let report = modcore_trust::assess(&source, &config)?;
    let rendered = modcore_trust::render_report(&report, options.format)?;
    args.emit(&rendered)?;

    // Exit code: 0 = pass, 1 = policy failure
    Ok(if report.verdict.pass { 0 } else { 1 })
}

fn cmd_scan(path: PathBuf, args: ReportArgs) -> Result<i32, TrustError> {
    let options = args.options();
    let report = modcore_trust::scan(&path, &options)?;
    let rendered = modcore_trust::render_report(&report, options.format)?;
    args.emit(&rendered)?;

    Ok(if report.verdict.pass { 0 } else { 1 })
}

fn cmd_what_if(path: PathBuf, disable: Vec<String>, args: ReportArgs) -> Result<i32, TrustError> {
    let options = args.options();
    let manifest_path = if path.is_dir() {
        path.join("manifest.json")
    } else {
        path
    };
    let base_dir = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = options.resolve_config(&base_dir)?;
    let calculator = config.calculator()?;

    let record = manifest::parse_manifest_file(&manifest_path)?;
    let permissions = config
        .policy
        .apply(&record.effective_permissions(&config.scan));

    let mut sandbox = Sandbox::new(&calculator, &permissions);
    for id in &disable {
        if !sandbox.set_enabled(id, false) {
            eprintln!("Warning: '{}' is not requested by {}", id, record.name);
        }
    }

    let outcome = sandbox.evaluate();
    let rendered = output::render_what_if(&outcome, &record.name, options.format)?;
    args.emit(&rendered)?;

    Ok(0)
}

fn cmd_list_permissions(format_str: String) -> Result<i32, TrustError> {
    let registry = modcore_trust::registry::PermissionRegistry::new();

    match format_str.as_str() {
        "json" => {
            let descriptors: Vec<_> = registry.iter().collect();
            let json = serde_json::to_string_pretty(&descriptors)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<36} {:<10} {:>6}  {:<20} CATEGORIES",
                "PERMISSION", "TIER", "POINTS", "IMPACT"
            );
            println!("{}", "-".repeat(96));
            for d in registry.iter() {
                let categories: Vec<String> = d.categories.iter().map(|c| c.to_string()).collect();
                println!(
                    "{:<36} {:<10} {:>6.1}  {:<20} {}",
                    d.id,
                    d.risk_tier.to_string(),
                    d.base_risk_points,
                    d.impact_type.to_string(),
                    categories.join(", "),
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, TrustError> {
    let path = PathBuf::from(CONFIG_FILE_NAME);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", CONFIG_FILE_NAME);
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {}", CONFIG_FILE_NAME);

    Ok(0)
}

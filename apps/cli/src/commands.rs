//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use mdexamples_core::lint::lint_bundles;
use mdexamples_core::pipeline::{BatchReport, DocumentOutcome, ProgressReporter};
use mdexamples_shared::{AppConfig, ConvertConfig, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mdexamples: turn narrative markdown into runnable example bundles.
#[derive(Parser)]
#[command(
    name = "mdexamples",
    version,
    about = "Convert markdown guides into example bundles (snippet, shell script, links).",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.mdexamples/mdexamples.toml.
    #[arg(long, global = true, env = "MDEXAMPLES_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert every markdown document in a directory into an example bundle.
    Convert {
        /// Directory containing `NNN-slug.md` documents.
        markdown_dir: PathBuf,

        /// Directory bundles are written into (defaults to `examples`).
        output_dir: Option<PathBuf>,

        /// Section map sidecar (defaults to `data/sections.json`).
        #[arg(long)]
        sections: Option<PathBuf>,
    },

    /// Check the comment structure of generated snippet files.
    Check {
        /// Directory holding the bundles (defaults to `examples`).
        output_dir: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mdexamples=info",
        1 => "mdexamples=debug",
        _ => "mdexamples=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Convert {
            markdown_dir,
            output_dir,
            sections,
        } => cmd_convert(&config, &markdown_dir, output_dir, sections),
        Command::Check { output_dir } => cmd_check(&config, output_dir),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_convert(
    config: &AppConfig,
    markdown_dir: &Path,
    output_dir: Option<PathBuf>,
    sections: Option<PathBuf>,
) -> Result<()> {
    let mut convert_config = ConvertConfig::from(config);
    if let Some(out) = output_dir {
        convert_config.output_dir = out;
    }
    if let Some(sections) = sections {
        convert_config.sections_file = sections;
    }

    info!(
        input = %markdown_dir.display(),
        output = %convert_config.output_dir.display(),
        "converting markdown documents"
    );

    let reporter = CliProgress::new();
    let report =
        mdexamples_core::pipeline::convert_directory(markdown_dir, &convert_config, &reporter)?;

    // Print summary
    println!();
    println!("  Conversion complete!");
    println!("  Seen:      {}", report.seen);
    println!("  Converted: {}", report.converted);
    println!("  Skipped:   {}", report.skipped);
    println!("  Output:    {}", convert_config.output_dir.display());
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_check(config: &AppConfig, output_dir: Option<PathBuf>) -> Result<()> {
    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));
    let findings = lint_bundles(&output_dir, &config.emit.snippet_extension)?;

    if findings.is_empty() {
        println!("All files have the correct comment structure.");
        return Ok(());
    }

    println!("FILES NEEDING FIXES:");
    for (i, finding) in findings.iter().enumerate() {
        let shown = finding
            .path
            .strip_prefix(&output_dir)
            .unwrap_or(&finding.path);
        println!("{}. {} - {}", i + 1, shown.display(), finding.issue);
    }

    Err(eyre!("{} snippet file(s) need fixing", findings.len()))
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_done(&self, id: &str, outcome: DocumentOutcome, current: usize, total: usize) {
        let verb = match outcome {
            DocumentOutcome::Converted => "Converted",
            DocumentOutcome::Skipped => "Skipped",
        };
        self.spinner
            .set_message(format!("{verb} [{current}/{total}] {id}"));
    }

    fn done(&self, _report: &BatchReport) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_requires_markdown_dir() {
        let err = Cli::try_parse_from(["mdexamples", "convert"]).err().unwrap();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn convert_output_dir_is_optional() {
        let cli = Cli::try_parse_from(["mdexamples", "convert", "docs"]).unwrap();
        match cli.command {
            Command::Convert {
                markdown_dir,
                output_dir,
                sections,
            } => {
                assert_eq!(markdown_dir, PathBuf::from("docs"));
                assert!(output_dir.is_none());
                assert!(sections.is_none());
            }
            _ => panic!("expected convert"),
        }

        let cli =
            Cli::try_parse_from(["mdexamples", "-v", "convert", "docs", "out", "--sections", "s.json"])
                .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Convert { output_dir, sections, .. } => {
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert_eq!(sections, Some(PathBuf::from("s.json")));
            }
            _ => panic!("expected convert"),
        }
    }
}

//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use kmimport_core::pipeline::{ImportConfig, ImportResult, ProgressReporter};
use kmimport_shared::{AppConfig, CrawlConfig, init_config, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// kmimport — map an RDF graph onto a knowledge model's questions.
#[derive(Parser)]
#[command(
    name = "kmimport",
    version,
    about = "Fill knowledge model replies from an RDF graph using question annotations.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.kmimport/kmimport.toml.
    #[arg(long, global = true, env = "KMIMPORT_CONFIG")]
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
    /// Import replies from a graph into a knowledge model.
    Import {
        /// Knowledge model JSON document.
        #[arg(long)]
        km: PathBuf,

        /// N-Triples or N-Quads graph.
        #[arg(long)]
        graph: PathBuf,

        /// Write the replies JSON here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Extra namespace prefix, as `prefix=iri` (repeatable).
        #[arg(long = "prefix", value_name = "PREFIX=IRI")]
        prefixes: Vec<String>,
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

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// clean for the replies JSON.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "kmimport=info",
        1 => "kmimport=debug",
        _ => "kmimport=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
    let config_path = cli.config;
    match cli.command {
        Command::Import {
            km,
            graph,
            out,
            prefixes,
        } => cmd_import(config_path, km, graph, out, &prefixes),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<PathBuf>) -> Result<AppConfig> {
    Ok(match path {
        Some(p) => load_config_from(&p)?,
        None => load_config()?,
    })
}

/// Parse `prefix=iri` pairs given on the command line.
fn parse_prefixes(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|entry| {
            let (prefix, iri) = entry
                .split_once('=')
                .ok_or_else(|| eyre!("invalid --prefix '{entry}': expected PREFIX=IRI"))?;
            if prefix.is_empty() || iri.is_empty() {
                return Err(eyre!("invalid --prefix '{entry}': expected PREFIX=IRI"));
            }
            Ok((prefix.to_string(), iri.to_string()))
        })
        .collect()
}

fn cmd_import(
    config_path: Option<PathBuf>,
    km: PathBuf,
    graph: PathBuf,
    out: Option<PathBuf>,
    prefixes: &[String],
) -> Result<()> {
    let config = resolve_config(config_path)?;

    let mut crawl = CrawlConfig::from(&config);
    crawl.prefixes.extend(parse_prefixes(prefixes)?);

    let import_config = ImportConfig {
        km_path: km,
        graph_path: graph,
        output: out,
        crawl,
        pretty: config.output.pretty,
    };

    info!(
        km = %import_config.km_path.display(),
        graph = %import_config.graph_path.display(),
        "importing replies"
    );

    let reporter = CliProgress::new();
    let result = kmimport_core::pipeline::import(&import_config, &reporter)?;

    match &result.output {
        Some(path) => {
            eprintln!();
            eprintln!("  Replies imported!");
            eprintln!("  Statements: {}", result.statements);
            eprintln!("  Items:      {}", result.summary.items_created);
            eprintln!("  Replies:    {}", result.summary.replies_set);
            eprintln!("  Output:     {}", path.display());
            eprintln!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
            eprintln!();
        }
        None => println!("{}", result.document.to_json(import_config.pretty)?),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &ImportResult) {
        self.spinner.finish_and_clear();
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use subreddit_stats::cli::table::StreamingTable;
use subreddit_stats::core::config::Config;
use subreddit_stats::core::errors::StatsError;
use subreddit_stats::logger::diagnostics::{DiagnosticEvent, Diagnostics};
use subreddit_stats::render::buffer::TableBuffer;
use subreddit_stats::render::format::{RowFormatter, Viewport};
use subreddit_stats::render::incremental::{GrowOutcome, IncrementalRenderer, RenderSink};
use subreddit_stats::source::provider::{DataProvider, DirectoryProvider, SubredditPayload};
use subreddit_stats::source::sample::{self, SampleSpec};
use subreddit_stats::stats::aggregate::{Aggregation, aggregate_payload};
use subreddit_stats::stats::leaderboard::{render_markdown, top_helpful};
use subreddit_stats::tui::{DashboardRuntimeConfig, run_dashboard};
use subreddit_stats::view::sort::SortColumn;
use subreddit_stats::view::state::{ViewId, ViewState};

/// Largest `--users` value accepted by `sample-data`.
const MAX_SAMPLE_USERS: usize = 100_000;

/// Subreddit comment statistics: tables, leaderboards and a live dashboard.
#[derive(Debug, Parser)]
#[command(
    name = "substats",
    author,
    version,
    about = "Subreddit comment statistics",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the data directory.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List the available subreddits.
    Subs,
    /// Print a subreddit's per-user table.
    Table(TableArgs),
    /// Show the most helpful users of a subreddit.
    Leaders(LeadersArgs),
    /// Interactive terminal dashboard.
    Dashboard(DashboardArgs),
    /// Write a synthetic data directory.
    SampleData(SampleDataArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct TableArgs {
    /// Subreddit name as listed by `substats subs`.
    subreddit: String,
    /// Sort column: username, comments, score or negative.
    #[arg(long, value_name = "COLUMN")]
    sort: Option<SortColumn>,
    /// Sort descending instead of ascending.
    #[arg(long, requires = "sort")]
    desc: bool,
    /// Username prefix filter (one leading `-` or `_` is ignored).
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,
    /// Number of pages to print.
    #[arg(long, default_value_t = 1, value_name = "N", conflicts_with = "all")]
    pages: usize,
    /// Print every row.
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Clone, Args)]
struct LeadersArgs {
    /// Subreddit name as listed by `substats subs`.
    subreddit: String,
    /// Emit the wiki-style markdown list.
    #[arg(long)]
    markdown: bool,
}

#[derive(Debug, Clone, Args)]
struct DashboardArgs {
    /// Event poll interval.
    #[arg(long, value_name = "MILLISECONDS")]
    tick_ms: Option<u64>,
}

#[derive(Debug, Clone, Args)]
struct SampleDataArgs {
    /// Output directory (defaults to the configured data directory).
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
    /// Number of subreddits.
    #[arg(long, default_value_t = 4, value_name = "N")]
    subs: usize,
    /// Distinct users per subreddit (upper bound).
    #[arg(long, default_value_t = 240, value_name = "N")]
    users: usize,
    /// Maximum comments per user.
    #[arg(long, default_value_t = 40, value_name = "N")]
    max_comments: usize,
    /// RNG seed.
    #[arg(long, default_value_t = 7, value_name = "SEED")]
    seed: u64,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print the config file path.
    Path,
    /// Print the effective configuration.
    Show,
    /// Load and validate the configuration.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// Operation partially succeeded.
    #[error("{0}")]
    Partial(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
            Self::Partial(_) => 4,
        }
    }
}

impl From<StatsError> for CliError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::InvalidConfig { .. }
            | StatsError::MissingConfig { .. }
            | StatsError::ConfigParse { .. }
            | StatsError::InvalidSubreddit { .. } => Self::User(err.to_string()),
            StatsError::Serialization { .. } => Self::Internal(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Subs => run_subs(cli),
        Command::Table(args) => run_table(cli, args),
        Command::Leaders(args) => run_leaders(cli, args),
        Command::Dashboard(args) => run_dashboard_command(cli, args),
        Command::SampleData(args) => run_sample_data(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── shared helpers ────────────────────

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data.dir.clone_from(dir);
    }
    if cli.verbose {
        eprintln!(
            "substats: config {} (data dir {})",
            config.config_file.display(),
            config.data.dir.display()
        );
    }
    Ok(config)
}

fn provider_for(config: &Config) -> DirectoryProvider {
    DirectoryProvider::new(config.data.dir.clone(), config.data.list_file.clone())
}

/// Fetch and aggregate one subreddit, logging what happened.
fn load_subreddit(
    config: &Config,
    diagnostics: &Diagnostics,
    name: &str,
    quiet: bool,
) -> Result<(SubredditPayload, Aggregation), CliError> {
    let provider = provider_for(config);
    let started = Instant::now();
    let payload = match provider.fetch_subreddit_data(name) {
        Ok(payload) => payload,
        Err(err) => {
            diagnostics.emit(DiagnosticEvent::fetch_failed(name, &err));
            return Err(err.into());
        }
    };
    let aggregation = aggregate_payload(&payload);
    diagnostics.emit(DiagnosticEvent::SubredditFetched {
        name: name.to_string(),
        users: aggregation.dataset.len(),
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    });
    for warning in &aggregation.warnings {
        diagnostics.emit(DiagnosticEvent::MalformedPayload {
            name: name.to_string(),
            details: warning.to_string(),
        });
        if !quiet {
            eprintln!("{} r/{name}: {warning}", "warning:".yellow());
        }
    }
    Ok((payload, aggregation))
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("SUBSTATS_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}

// ──────────────────── subs ────────────────────

fn run_subs(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let list = provider_for(&config).fetch_subreddit_list()?;

    match output_mode(cli) {
        OutputMode::Human => {
            if list.subs.is_empty() && !cli.quiet {
                println!("No subreddits listed in {}", config.list_path().display());
            }
            for (i, name) in list.subs.iter().enumerate() {
                println!("{:>3}. r/{name}", i + 1);
            }
        }
        OutputMode::Json => {
            write_json_line(&json!({
                "command": "subs",
                "subs": list.subs,
            }))?;
        }
    }
    Ok(())
}

// ──────────────────── table ────────────────────

fn run_table(cli: &Cli, args: &TableArgs) -> Result<(), CliError> {
    if args.pages == 0 {
        return Err(CliError::User("--pages must be at least 1".to_string()));
    }
    let config = load_config(cli)?;
    let diagnostics = Diagnostics::from_config(&config.log);
    let (payload, aggregation) = load_subreddit(&config, &diagnostics, &args.subreddit, cli.quiet)?;

    let mut view = ViewState::new(ViewId::new(1), aggregation.dataset);
    if let Some(query) = &args.search {
        view.apply_search(query);
    }
    if let Some(column) = args.sort {
        view.activate_sort(column);
        if args.desc {
            view.activate_sort(column);
        }
    }

    let formatter = RowFormatter::from_config(&config.display);
    let viewport = crossterm::terminal::size()
        .map_or(Viewport::new(120, 40), |(cols, rows)| Viewport::new(cols, rows));
    let mut renderer = IncrementalRenderer::new(config.render.page_size, formatter, viewport);
    let page_budget = if args.all { usize::MAX } else { args.pages };

    let mode = output_mode(cli);
    let shown = match mode {
        OutputMode::Human => {
            if !cli.quiet {
                let updated = payload.timestamp_label().unwrap_or_else(|| "unknown".to_string());
                println!(
                    "{}  {} users  updated {updated}  sort: {}",
                    format!("r/{}", args.subreddit).bold(),
                    view.base().len(),
                    view.sort().label(),
                );
            }
            let width = renderer
                .formatter()
                .username_width(renderer.username_limit());
            let mut table = StreamingTable::new(io::stdout().lock(), width, view.sort());
            page_through(&mut renderer, &view, &mut table, page_budget);
            let (written, _) = table.finish()?;
            written
        }
        OutputMode::Json => {
            let mut buffer = TableBuffer::default();
            page_through(&mut renderer, &view, &mut buffer, page_budget);
            write_json_line(&json!({
                "command": "table",
                "subreddit": args.subreddit,
                "timestamp": payload.timestamp,
                "sort": view.sort().label(),
                "search": view.search().query,
                "total": view.len(),
                "shown": buffer.len(),
                "rows": serde_json::to_value(buffer.rows())?,
            }))?;
            buffer.len()
        }
    };

    diagnostics.emit(DiagnosticEvent::ViewLoaded {
        name: args.subreddit.clone(),
        rows: view.len(),
    });
    diagnostics.flush();

    if mode == OutputMode::Human && !cli.quiet {
        let more = if shown < view.len() {
            "  (use --pages N or --all for more)"
        } else {
            ""
        };
        println!("{}", format!("{shown}/{} rows{more}", view.len()).dimmed());
    }
    Ok(())
}

/// Reset the renderer on `view`, then grow until `pages` pages are out.
fn page_through(
    renderer: &mut IncrementalRenderer,
    view: &ViewState,
    sink: &mut dyn RenderSink,
    pages: usize,
) {
    renderer.reset(view, sink);
    let token = view.token();
    for _ in 1..pages {
        match renderer.grow(token, view, sink) {
            GrowOutcome::Appended { exhausted: false, .. } => {}
            GrowOutcome::Appended { exhausted: true, .. }
            | GrowOutcome::Exhausted
            | GrowOutcome::Stale => break,
        }
    }
}

// ──────────────────── leaders ────────────────────

fn run_leaders(cli: &Cli, args: &LeadersArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let diagnostics = Diagnostics::from_config(&config.log);
    let (_, aggregation) = load_subreddit(&config, &diagnostics, &args.subreddit, cli.quiet)?;
    diagnostics.flush();
    let leaders = top_helpful(&aggregation.dataset);

    match output_mode(cli) {
        OutputMode::Human if args.markdown => {
            let title = format!("Most helpful users of r/{}", args.subreddit);
            println!("{}", render_markdown(&title, &leaders));
        }
        OutputMode::Human => {
            if leaders.is_empty() {
                if !cli.quiet {
                    println!("No qualifying users in r/{}", args.subreddit);
                }
                return Ok(());
            }
            for (rank, user) in leaders.iter().enumerate() {
                println!(
                    "{:>3}. {:<28} {}",
                    rank + 1,
                    user.username,
                    format!("{:.2}", user.average_score).green()
                );
            }
        }
        OutputMode::Json => {
            write_json_line(&json!({
                "command": "leaders",
                "subreddit": args.subreddit,
                "users": serde_json::to_value(&leaders)?,
            }))?;
        }
    }
    Ok(())
}

// ──────────────────── dashboard ────────────────────

fn run_dashboard_command(cli: &Cli, args: &DashboardArgs) -> Result<(), CliError> {
    if cli.json {
        return Err(CliError::User(
            "the dashboard is interactive and has no JSON output".to_string(),
        ));
    }
    if !io::stdout().is_terminal() {
        return Err(CliError::User(
            "the dashboard needs an interactive terminal".to_string(),
        ));
    }

    let mut config = load_config(cli)?;
    if let Some(tick_ms) = args.tick_ms {
        config.dashboard.tick_ms = tick_ms;
        config.validate()?;
    }
    let runtime = DashboardRuntimeConfig::from_config(&config)?;
    let diagnostics = Diagnostics::from_config(&config.log);
    let provider: Arc<dyn DataProvider> = Arc::new(provider_for(&config));
    run_dashboard(&runtime, provider, diagnostics)?;
    Ok(())
}

// ──────────────────── sample-data ────────────────────

fn run_sample_data(cli: &Cli, args: &SampleDataArgs) -> Result<(), CliError> {
    if args.users > MAX_SAMPLE_USERS {
        return Err(CliError::User(format!(
            "--users must be at most {MAX_SAMPLE_USERS}"
        )));
    }
    if args.subs == 0 {
        return Err(CliError::User("--subs must be at least 1".to_string()));
    }
    let config = load_config(cli)?;
    let dir = args.out.clone().unwrap_or_else(|| config.data.dir.clone());

    let data = sample::generate(SampleSpec {
        subs: args.subs,
        users: args.users,
        max_comments: args.max_comments,
        seed: args.seed,
    });
    sample::write_directory(&dir, &config.data.list_file, &data)?;

    match output_mode(cli) {
        OutputMode::Human => {
            if !cli.quiet {
                println!(
                    "Wrote {} subreddits to {}",
                    data.list.subs.len(),
                    dir.display()
                );
                for name in &data.list.subs {
                    println!("  r/{name}");
                }
            }
        }
        OutputMode::Json => {
            write_json_line(&json!({
                "command": "sample-data",
                "dir": dir.to_string_lossy(),
                "subs": data.list.subs,
                "seed": args.seed,
            }))?;
        }
    }
    Ok(())
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    write_json_line(&json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    }))?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    write_json_line(&json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    }))?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match load_config(cli) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        write_json_line(&json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.config_file.to_string_lossy(),
                            "hash": hash,
                        }))?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("Configuration is INVALID: {e}");
                    }
                    OutputMode::Json => {
                        write_json_line(&json!({
                            "command": "config validate",
                            "valid": false,
                            "error": e.to_string(),
                        }))?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ──────────────────── tests ────────────────────

// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::Path;

use proofreader::app_config::{CompletionProviderKind, Config, LogLevel};
use proofreader::app_controller::{word_diff, Controller, Reviewer, SessionOptions, SessionReport, WritePreview};
use proofreader::editorial::{ReviewDecision, ReviewItem, TreeStrategy};

/// CLI Wrapper for CompletionProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliProvider> for CompletionProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Ollama => CompletionProviderKind::Ollama,
            CliProvider::OpenAI => CompletionProviderKind::OpenAI,
            CliProvider::Anthropic => CompletionProviderKind::Anthropic,
            CliProvider::LMStudio => CompletionProviderKind::LMStudio,
        }
    }
}

/// CLI Wrapper for TreeStrategy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTreeStrategy {
    Splice,
    Rewrite,
}

impl From<CliTreeStrategy> for TreeStrategy {
    fn from(cli_strategy: CliTreeStrategy) -> Self {
        match cli_strategy {
            CliTreeStrategy::Splice => TreeStrategy::Splice,
            CliTreeStrategy::Rewrite => TreeStrategy::Rewrite,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Review a draft and write approved edits back (default command)
    Review(ReviewArgs),

    /// List drafts in the store
    Drafts {
        /// Maximum number of drafts to list
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate shell completions for proofreader
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that talks to the store
#[derive(clap::Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Ghost site URL
    #[arg(long, env = "GHOST_URL")]
    url: Option<String>,

    /// Ghost Admin API key (id:secret)
    #[arg(long, env = "GHOST_ADMIN_API_KEY", hide_env_values = true)]
    admin_key: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
struct ReviewArgs {
    /// Document to review; prompts with the list of drafts when omitted
    #[arg(value_name = "DOCUMENT_ID")]
    document_id: Option<String>,

    /// Completion provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the completion provider
    #[arg(long, env = "PROOFREADER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// How approved edits are applied to a Lexical body
    #[arg(long, value_enum)]
    strategy: Option<CliTreeStrategy>,

    /// Review and patch, but never write
    #[arg(long)]
    dry_run: bool,

    /// Write without the final confirmation (still asked above the deletion threshold)
    #[arg(short, long)]
    yes: bool,

    #[command(flatten)]
    common: CommonArgs,
}

/// Proofreader - editorial review of Ghost drafts with AI
///
/// Runs style, typo, structure and coherence analysis over a draft, lets you
/// approve or reject each suggestion, and writes the approved edits back.
#[derive(Parser, Debug)]
#[command(name = "proofreader")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "AI-assisted editorial review for Ghost drafts")]
#[command(long_about = "Proofreader analyses a Ghost draft, presents each suggestion for approval, and writes approved edits back once.

EXAMPLES:
    proofreader                                  # Pick a draft and review it
    proofreader 65f1c0ffee                       # Review a specific draft
    proofreader --dry-run 65f1c0ffee             # Review and patch without saving
    proofreader -p openai -m gpt-4o 65f1c0ffee   # Use a specific provider and model
    proofreader drafts -n 10                     # List the ten newest drafts
    proofreader completions bash > proofreader.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. GHOST_URL, GHOST_ADMIN_API_KEY and
    PROOFREADER_API_KEY override the file.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    review: ReviewArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, colour) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

// @struct: Interactive reviewer on the terminal
struct TerminalReviewer {
    theme: ColorfulTheme,
}

impl TerminalReviewer {
    fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Reviewer for TerminalReviewer {
    fn decide(&mut self, item: &ReviewItem<'_>) -> Result<ReviewDecision> {
        let suggestion = item.suggestion;

        println!();
        println!(
            "[{}/{}] {} {}",
            item.position,
            item.total,
            suggestion.kind,
            if suggestion.location.is_empty() {
                String::new()
            } else {
                format!("({})", suggestion.location)
            }
        );
        println!("  {}", word_diff(&suggestion.original_text, &suggestion.proposed_text));
        if !suggestion.reasoning.is_empty() {
            println!("  Why: {}", suggestion.reasoning);
        }

        let choice = Select::with_theme(&self.theme)
            .with_prompt("Apply this change?")
            .items(&["Approve", "Reject", "Quit without saving"])
            .default(0)
            .interact()
            .context("Failed to read decision")?;

        match choice {
            0 => Ok(ReviewDecision::Approve),
            1 => Ok(ReviewDecision::Reject),
            _ => Err(anyhow!("Review quit by user")),
        }
    }

    fn show_preview(&mut self, preview: &WritePreview<'_>) -> Result<()> {
        println!();
        println!("Patched body of '{}':", preview.document.title);
        println!("{}", preview.rendered_body());
        println!();
        println!("Changes in the visible text:");
        println!("  {}", preview.visible_diff());
        Ok(())
    }

    fn confirm_write(&mut self, preview: &WritePreview<'_>) -> Result<bool> {
        let patch = preview.patch;

        println!();
        println!(
            "'{}': {} change(s) applied via {}",
            preview.document.title, patch.applied, patch.strategy
        );
        for unmatched in &patch.unmatched {
            println!("  not found: \"{}\"", unmatched.excerpt);
        }
        for degradation in &patch.degradations {
            println!("  note: {}", degradation);
        }
        if preview.exceeds_threshold {
            println!(
                "  ⚠️  this removes {:.0}% of the visible text",
                preview.shrink_ratio * 100.0
            );
        }

        Confirm::with_theme(&self.theme)
            .with_prompt("Save these changes to the store?")
            .default(!preview.exceeds_threshold)
            .interact()
            .context("Failed to read confirmation")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with info level; the configured level is applied once loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "proofreader", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Drafts { limit, common }) => run_drafts(common, limit).await,
        Some(Commands::Review(args)) => run_review(args).await,
        None => run_review(cli.review).await,
    }
}

/// Load the configuration and apply the shared overrides
fn load_config(common: &CommonArgs) -> Result<Config> {
    if let Some(level) = &common.log_level {
        let level: LogLevel = level.clone().into();
        log::set_max_level(LevelFilter::from(&level));
    }

    let mut config = Config::load_or_create(Path::new(&common.config_path))?;

    if let Some(url) = &common.url {
        config.store.url = url.clone();
    }
    if let Some(admin_key) = &common.admin_key {
        config.store.admin_api_key = admin_key.clone();
    }
    if let Some(level) = &common.log_level {
        config.log_level = level.clone().into();
    }

    if !config.store.is_configured() {
        return Err(anyhow!(
            "No Ghost site configured: set store.url and store.admin_api_key in {} or GHOST_URL and GHOST_ADMIN_API_KEY",
            common.config_path
        ));
    }

    Ok(config)
}

fn apply_log_level(config: &Config, common: &CommonArgs) {
    if common.log_level.is_none() {
        log::set_max_level(LevelFilter::from(&config.log_level));
    }
}

async fn run_drafts(common: CommonArgs, limit: usize) -> Result<()> {
    let config = load_config(&common)?;
    config.validate().context("Configuration validation failed")?;
    apply_log_level(&config, &common);

    let controller = Controller::with_config(config)?;
    let drafts = controller.list_drafts(limit).await?;

    if drafts.is_empty() {
        info!("No drafts found");
        return Ok(());
    }

    for draft in drafts {
        println!("{}  {}  ({})", draft.id, draft.title, draft.updated_at);
    }
    Ok(())
}

async fn run_review(args: ReviewArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;

    if let Some(provider) = &args.provider {
        config.completion.provider = provider.clone().into();
    }
    if let Some(model) = &args.model {
        config.completion.active_provider_config_mut().model = model.clone();
    }
    if let Some(api_key) = &args.api_key {
        config.completion.active_provider_config_mut().api_key = api_key.clone();
    }
    if let Some(strategy) = &args.strategy {
        config.review.tree_strategy = strategy.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    apply_log_level(&config, &args.common);

    let controller = Controller::with_config(config)?.with_options(SessionOptions {
        dry_run: args.dry_run,
        assume_yes: args.yes,
        show_progress: true,
    });

    let document_id = match args.document_id {
        Some(id) => id,
        None => pick_draft(&controller).await?,
    };

    let mut reviewer = TerminalReviewer::new();
    let report = controller.review(&document_id, &mut reviewer).await?;
    print_report(&report);
    Ok(())
}

async fn pick_draft(controller: &Controller) -> Result<String> {
    let drafts = controller.list_drafts(20).await?;
    if drafts.is_empty() {
        return Err(anyhow!("No drafts found"));
    }

    let items: Vec<String> = drafts
        .iter()
        .map(|d| format!("{} ({})", d.title, d.updated_at))
        .collect();

    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which draft should be reviewed?")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to read draft selection")?;

    Ok(drafts[index].id.clone())
}

fn print_report(report: &SessionReport) {
    println!();
    println!("{}", report.pipeline.summary());
    for failure in &report.pipeline.failures {
        warn!("{} skipped: {}", failure.stage, failure.message);
    }

    let applied = report.patch.as_ref().map(|p| p.applied).unwrap_or(0);
    println!(
        "Approved {}/{}, applied {} - {}",
        report.approved,
        report.pipeline.suggestions.len(),
        applied,
        report.status
    );
    if let Some(saved) = &report.saved {
        println!("Saved '{}' (version {})", saved.title, saved.updated_at);
    }
}

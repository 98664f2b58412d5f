use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chat_context::format::exceeds_budget;
use chat_context::{
    Config, ContextBuilder, ContextRepo, ContextService, ConversationLog, FormatOverrides,
    OutputFormat, Platform, db, estimate_tokens, export_file_name,
};

/// Chat Context - capture AI chat conversations and reuse them as context
#[derive(Parser)]
#[command(name = "chat-context", version, about)]
struct Cli {
    /// Path to the context database
    #[arg(long, env = "CHAT_CONTEXT_DB", global = true)]
    database: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture a conversation from a saved chat page or a conversation log
    Capture {
        /// Saved HTML snapshot of a chat page
        #[arg(long, conflicts_with = "log", required_unless_present = "log")]
        html: Option<PathBuf>,
        /// Page URL, used to identify the platform
        #[arg(long, requires = "html")]
        url: Option<String>,
        /// Platform the snapshot was taken from (overrides --url)
        #[arg(long, value_enum, requires = "html")]
        platform: Option<Platform>,
        /// Conversation log as JSON (`messages`, `source`, `updatedAt`)
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// List stored contexts, most recent first
    List,
    /// Render a stored context
    Show {
        /// Context ID
        id: String,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Write a stored context file as JSON
    Export {
        /// Context ID
        id: String,
        /// Output path (defaults to chat-context-<millis>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a previously exported context file
    Import {
        /// Path to the context file
        file: PathBuf,
    },
    /// Delete a stored context
    Delete {
        /// Context ID
        id: String,
    },
    /// Delete every stored context
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Estimate the token count of a text file
    Tokens {
        /// File to measure
        file: PathBuf,
        /// Warn when the estimate exceeds this many tokens
        #[arg(long)]
        max_tokens: Option<usize>,
    },
}

/// Rendering flags for `show`
#[derive(Args)]
struct FormatArgs {
    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
    /// Approximate token budget
    #[arg(long)]
    max_tokens: Option<usize>,
    /// Leave out the summary
    #[arg(long)]
    no_summary: bool,
    /// Leave out the key insights
    #[arg(long)]
    no_insights: bool,
    /// Sample long conversations evenly instead of keeping the latest turns
    #[arg(long)]
    even: bool,
}

impl FormatArgs {
    fn overrides(&self) -> FormatOverrides {
        FormatOverrides {
            max_tokens: self.max_tokens,
            include_summary: self.no_summary.then_some(false),
            include_key_insights: self.no_insights.then_some(false),
            prefer_recent_messages: self.even.then_some(false),
            format: self.format,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,chat_context=info",
        1 => "info,chat_context=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }
    tracing::debug!(?config, "loaded configuration");

    // Token estimation needs no database
    let command = match cli.command {
        Command::Tokens { file, max_tokens } => {
            return cmd_tokens(&file, max_tokens.unwrap_or(config.format.max_tokens));
        }
        command => command,
    };

    let pool = db::init(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let service = ContextService::new(
        ContextRepo::new(pool),
        ContextBuilder::new(config.insights.clone()),
    );

    match command {
        Command::Capture {
            html,
            url,
            platform,
            log,
        } => cmd_capture(&service, html.as_deref(), url.as_deref(), platform, log.as_deref()),
        Command::List => cmd_list(&service),
        Command::Show { id, format } => cmd_show(&service, &config, &id, &format),
        Command::Export { id, output } => cmd_export(&service, &id, output),
        Command::Import { file } => {
            let text = read_file(&file)?;
            let stored = service.import_json(&text)?;
            println!("{}", stored.id);
            Ok(())
        }
        Command::Delete { id } => {
            service.delete(&id)?;
            println!("Deleted {id}");
            Ok(())
        }
        Command::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to delete all contexts without --yes");
            }
            let count = service.clear()?;
            println!("Deleted {count} context(s)");
            Ok(())
        }
        Command::Tokens { .. } => Ok(()),
    }
}

type Service = ContextService<ContextRepo>;

fn cmd_capture(
    service: &Service,
    html: Option<&Path>,
    url: Option<&str>,
    platform: Option<Platform>,
    log: Option<&Path>,
) -> anyhow::Result<()> {
    let stored = if let Some(path) = html {
        let platform = platform
            .or_else(|| url.map(Platform::identify))
            .unwrap_or_default();
        if platform == Platform::Unknown {
            tracing::warn!("unsupported platform, nothing will be extracted; pass --platform");
        }
        service.capture_page(platform, &read_file(path)?, Utc::now())?
    } else if let Some(path) = log {
        let log: ConversationLog = serde_json::from_str(&read_file(path)?)
            .with_context(|| format!("parsing conversation log {}", path.display()))?;
        service.capture(&log)?
    } else {
        anyhow::bail!("either --html or --log is required");
    };

    println!(
        "{}  {} messages from {}",
        stored.id, stored.file.metadata.message_count, stored.file.metadata.source
    );
    Ok(())
}

fn cmd_list(service: &Service) -> anyhow::Result<()> {
    let contexts = service.list()?;
    if contexts.is_empty() {
        println!("No saved contexts");
        return Ok(());
    }

    for info in contexts {
        println!(
            "{:<24} {:<10} {:>4} messages  {}",
            info.id,
            info.source,
            info.message_count,
            chat_context::format::format_date(info.created_at)
        );
    }
    Ok(())
}

fn cmd_show(service: &Service, config: &Config, id: &str, args: &FormatArgs) -> anyhow::Result<()> {
    let options = config.format_options(&args.overrides());
    let output = service.render(id, &options)?.into_string()?;

    if exceeds_budget(&output, options.max_tokens) {
        tracing::warn!(
            estimated = estimate_tokens(&output),
            max_tokens = options.max_tokens,
            "rendered context exceeds token budget"
        );
    }

    println!("{output}");
    Ok(())
}

fn cmd_export(service: &Service, id: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let json = service.export_json(id)?;
    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(Utc::now())));

    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("Exported {id} to {}", path.display());
    Ok(())
}

fn cmd_tokens(file: &Path, max_tokens: usize) -> anyhow::Result<()> {
    let text = read_file(file)?;
    let tokens = estimate_tokens(&text);
    println!("{tokens}");

    if exceeds_budget(&text, max_tokens) {
        tracing::warn!(tokens, max_tokens, "text exceeds token budget");
    }
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

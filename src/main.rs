//! CLI entry point for `msgview`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use humansize::{format_size, DECIMAL};

use msgview::config::{self, Config};
use msgview::index::{self, FolderNode};
use msgview::model::Message;
use msgview::storage::{PropertyTag, PropertyValue};

#[derive(Parser)]
#[command(name = "msgview", version)]
#[command(about = "Inspect Outlook .msg files: index folder trees and decode message properties")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a directory tree and print the folder/message tree
    Tree {
        /// Root directory to index
        dir: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show a decoded message (subject, sender, recipients, body, attachments)
    Show {
        /// Path to the .msg file
        file: PathBuf,
        #[arg(long)]
        json: bool,
        /// Print the full body instead of the configured preview length
        #[arg(long)]
        full: bool,
    },
    /// Dump raw MAPI properties of a message
    Props {
        /// Path to the .msg file
        file: PathBuf,
        /// A single property tag to print in full, as 4 hex digits (e.g. 5D01)
        tag: Option<String>,
    },
    /// Extract all attachments of a message into a directory
    Attachments {
        /// Path to the .msg file
        file: PathBuf,
        /// Output directory (created if missing)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Tree { dir, json } => cmd_tree(&dir, json, &config),
        Commands::Show { file, json, full } => cmd_show(&file, json, full, &config),
        Commands::Props { file, tag } => cmd_props(&file, tag.as_deref()),
        Commands::Attachments { file, output } => cmd_attachments(&file, &output),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "msgview.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "msgview", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Index a directory tree and print it.
fn cmd_tree(dir: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }
    let tree = index::index_with_extension(dir, &config.general.message_extension);

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    print_tree(&tree, 0);
    println!();
    println!(
        "{} message file(s) under {}",
        tree.message_count(),
        dir.display()
    );
    Ok(())
}

fn print_tree(node: &FolderNode, depth: usize) {
    let indent = "  ".repeat(depth);
    if node.access_denied {
        println!("{indent}! {}", node.name);
        return;
    }
    println!("{indent}{}/", node.name);
    for msg in &node.messages {
        println!("{indent}  - {}", msg.name);
    }
    for folder in &node.folders {
        print_tree(folder, depth + 1);
    }
}

/// Load a message and print its decoded fields.
fn cmd_show(file: &Path, json: bool, full: bool, config: &Config) -> anyhow::Result<()> {
    let message = Message::load(file)?;

    if json {
        let attachments: Vec<serde_json::Value> = message
            .attachments()
            .iter()
            .map(|a| serde_json::json!({ "filename": a.filename, "size": a.size() }))
            .collect();
        let out = serde_json::json!({
            "subject": message.subject(),
            "from": message.from_line(),
            "to": message.to_summary(),
            "cc": message.cc_summary(),
            "bcc": message.bcc_summary(),
            "submitted": message.submitted().map(|t| t.to_rfc3339()),
            "delivered": message.delivered().map(|t| t.to_rfc3339()),
            "message_class": message.message_class(),
            "recipients": message.recipients(),
            "attachments": attachments,
            "body": message.body(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Subject: {}", message.subject());
    println!("From:    {}", message.from_line());
    println!("To:      {}", message.to_summary());
    let cc = message.cc_summary();
    if !cc.is_empty() {
        println!("CC:      {cc}");
    }
    let bcc = message.bcc_summary();
    if !bcc.is_empty() {
        println!("BCC:     {bcc}");
    }
    if let Some(date) = message.submitted().or(message.delivered()) {
        println!(
            "Date:    {}",
            date.format(&config.display.date_format)
        );
    }

    if !message.attachments().is_empty() {
        println!();
        println!("Attachments:");
        for att in message.attachments() {
            println!("  {} ({})", att.filename, format_size(att.size(), DECIMAL));
        }
    }

    println!();
    let body = message.body();
    let limit = config.display.body_preview_chars;
    if !full && limit > 0 && body.chars().count() > limit {
        let preview: String = body.chars().take(limit).collect();
        println!("{preview}");
        println!("[... truncated, use --full for the whole body]");
    } else {
        println!("{body}");
    }
    Ok(())
}

/// Dump raw properties, one line per tag, or one tag in full.
fn cmd_props(file: &Path, tag: Option<&str>) -> anyhow::Result<()> {
    let message = Message::load(file)?;

    if let Some(raw) = tag {
        let tag = PropertyTag::from_hex(raw)
            .ok_or_else(|| anyhow::anyhow!("invalid property tag: '{raw}'"))?;
        print_property_full(tag, message.raw_property(tag));
        return Ok(());
    }

    for tag in message.tags() {
        let value = message.raw_property(tag);
        match value {
            PropertyValue::Text(s) => {
                println!("{tag}: {}", single_line(s, 80));
            }
            PropertyValue::Binary(b) => {
                println!("{tag}: <binary, {} bytes>", b.len());
            }
            PropertyValue::Unreadable(reason) => {
                println!("{tag}: <unreadable: {reason}>");
            }
            PropertyValue::Time(t) => println!("{tag}: {}", t.to_rfc3339()),
            other => println!("{tag}: {other:?}"),
        }
    }
    Ok(())
}

fn print_property_full(tag: PropertyTag, value: &PropertyValue) {
    match value {
        PropertyValue::Absent => println!("{tag}: absent"),
        PropertyValue::Text(s) => println!("{s}"),
        PropertyValue::Binary(b) => {
            // Hex dump, 16 bytes per line.
            for chunk in b.chunks(16) {
                let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
                println!("{}", hex.join(" "));
            }
        }
        PropertyValue::Unreadable(reason) => println!("{tag}: unreadable ({reason})"),
        PropertyValue::Time(t) => println!("{}", t.to_rfc3339()),
        other => println!("{other:?}"),
    }
}

fn single_line(s: &str, max: usize) -> String {
    let mut out: String = s
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .take(max)
        .collect();
    if s.chars().count() > max {
        out.push('…');
    }
    out
}

/// Write every attachment of a message into `output`.
fn cmd_attachments(file: &Path, output: &Path) -> anyhow::Result<()> {
    let message = Message::load(file)?;
    if message.attachments().is_empty() {
        println!("No attachments in {}", file.display());
        return Ok(());
    }

    std::fs::create_dir_all(output)?;
    for att in message.attachments() {
        let target = output.join(sanitize_filename(&att.filename));
        std::fs::write(&target, &att.data)?;
        println!(
            "Wrote {} ({})",
            target.display(),
            format_size(att.size(), DECIMAL)
        );
    }
    Ok(())
}

/// Keep attachment names from escaping the output directory.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim_matches('.').trim();
    if trimmed.is_empty() {
        "attachment".to_string()
    } else {
        trimmed.to_string()
    }
}

//! Texdraft CLI
//!
//! The `texdraft` command inspects and compiles a LaTeX manuscript directory.
//!
//! ## Commands
//!
//! - `outline`: Print the heading outline (flat or nested)
//! - `sections`: Print navigation labels for each heading
//! - `files`: List every file in the manuscript directory
//! - `compile`: Run the build tool and write the artifact
//! - `pages`: Count the pages of a compiled PDF

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use texdraft_build::{BuildTool, Compiler, TokioProcessRunner};
use texdraft_core::{
    count_pages, extract_outline, extract_outline_tree, list_files, section_label,
    CompileStatus, EditorSession, Effect, Manuscript, OutlineNode, SessionAction,
    TexdraftConfig, TexdraftError, CONFIG_FILE_NAME,
};
use tracing::{debug, info, Level};

const EXIT_SUCCESS: u8 = 0;
/// Exit code for compile failures, timeouts and tool errors.
const EXIT_COMPILE_FAILED: u8 = 1;
/// Exit code for precondition failures.
const EXIT_VALIDATION: u8 = 2;

#[derive(Parser)]
#[command(name = "texdraft")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LaTeX manuscript outline and compile tool", long_about = None)]
struct Cli {
    /// Config file (default: ./texdraft.toml)
    #[arg(long, global = true, env = "TEXDRAFT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the heading outline of the manuscript source
    Outline {
        /// Manuscript directory (default: [manuscript].dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Nest headings by level
        #[arg(long)]
        tree: bool,

        /// Emit JSON instead of indented text
        #[arg(long)]
        json: bool,
    },

    /// Print one navigation label per heading
    Sections {
        /// Manuscript directory (default: [manuscript].dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// List files in the manuscript directory
    Files {
        /// Manuscript directory (default: [manuscript].dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Compile the manuscript and write the artifact
    Compile {
        /// Manuscript directory (default: [manuscript].dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Timeout in seconds (default: [build].timeout_secs)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Directory the artifact is written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Replace the source with this file's contents before compiling
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Count pages in a compiled PDF
    Pages {
        /// PDF file
        pdf: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    texdraft_core::init_tracing(cli.json_logs, level);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = TexdraftConfig::load(&config_path)
        .context("Failed to load configuration")?
        .with_env();
    debug!(?config, "Effective configuration");

    let outcome = match cli.command {
        Commands::Outline { dir, tree, json } => {
            cmd_outline(&resolve_dir(&config, dir), tree, json)
        }
        Commands::Sections { dir } => cmd_sections(&resolve_dir(&config, dir)),
        Commands::Files { dir } => cmd_files(&resolve_dir(&config, dir)),
        Commands::Compile {
            dir,
            timeout,
            out,
            from,
        } => {
            cmd_compile(
                &config,
                &resolve_dir(&config, dir),
                timeout,
                &out,
                from.as_deref(),
            )
            .await
        }
        Commands::Pages { pdf } => cmd_pages(&pdf),
    };

    exit_status(outcome).map(ExitCode::from)
}

/// Turn validation failures into exit code 2; other errors propagate.
fn exit_status(outcome: Result<u8>) -> Result<u8> {
    match outcome {
        Err(err) if is_validation(&err) => {
            eprintln!("error: {err:#}");
            Ok(EXIT_VALIDATION)
        }
        other => other,
    }
}

fn resolve_dir(config: &TexdraftConfig, dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| config.manuscript.dir.clone())
}

fn is_validation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<TexdraftError>(),
            Some(TexdraftError::Validation(_))
        ) || cause
            .downcast_ref::<texdraft_core::ValidationError>()
            .is_some()
    })
}

fn open_manuscript(dir: &Path) -> Result<Manuscript> {
    Manuscript::open(dir).with_context(|| format!("Cannot use manuscript at {}", dir.display()))
}

/// Print the outline
fn cmd_outline(dir: &Path, tree: bool, json: bool) -> Result<u8> {
    let manuscript = open_manuscript(dir)?;
    let text = manuscript.read_source()?;

    if tree {
        let nodes = extract_outline_tree(&text);
        if json {
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        } else if nodes.is_empty() {
            println!("No headings found in {}", manuscript.source_name());
        } else {
            for node in &nodes {
                print_node(node, 0);
            }
        }
    } else {
        let entries = extract_outline(&text);
        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else if entries.is_empty() {
            println!("No headings found in {}", manuscript.source_name());
        } else {
            for entry in &entries {
                println!(
                    "{:>5}  {}{}",
                    entry.line + 1,
                    "  ".repeat(entry.depth),
                    entry.title
                );
            }
        }
    }
    Ok(EXIT_SUCCESS)
}

fn print_node(node: &OutlineNode, indent: usize) {
    println!(
        "{:>5}  {}{} [{}]",
        node.line + 1,
        "  ".repeat(indent),
        node.title,
        node.level
    );
    for child in &node.children {
        print_node(child, indent + 1);
    }
}

/// Print navigation labels
fn cmd_sections(dir: &Path) -> Result<u8> {
    let manuscript = open_manuscript(dir)?;
    let text = manuscript.read_source()?;
    for entry in extract_outline(&text) {
        println!("{}", section_label(&entry));
    }
    Ok(EXIT_SUCCESS)
}

/// List manuscript files
fn cmd_files(dir: &Path) -> Result<u8> {
    let manuscript = open_manuscript(dir)?;
    let files = list_files(manuscript.dir())?;
    if files.is_empty() {
        println!("No files in {}", manuscript.dir().display());
    }
    for file in files {
        println!("{}", file.display());
    }
    Ok(EXIT_SUCCESS)
}

/// Save (optionally), compile, and write the artifact
async fn cmd_compile(
    config: &TexdraftConfig,
    dir: &Path,
    timeout: Option<u64>,
    out: &Path,
    from: Option<&Path>,
) -> Result<u8> {
    let manuscript = open_manuscript(dir)?;
    let mut session = EditorSession::from_manuscript(&manuscript, &config.editor)?;

    if let Some(path) = from {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        session = session.apply(SessionAction::Edit(text), Utc::now()).0;
    }

    let (session, effect) = session.apply(SessionAction::Compile, Utc::now());
    match &effect {
        Effect::WriteAndCompile { text } => {
            manuscript
                .save_source(text)
                .context("Failed to save source before compiling")?;
            info!(source = %manuscript.source_name(), "Saved edited source");
        }
        Effect::Compile => {}
        other => anyhow::bail!("unexpected session effect for compile: {other:?}"),
    }

    let timeout_secs = timeout.unwrap_or(config.build.timeout_secs);
    let compiler = Compiler::new(TokioProcessRunner, BuildTool::from_config(&config.build));
    println!(
        "Compiling {} with {} (timeout {}s)...",
        manuscript.source_name(),
        compiler.tool().program,
        timeout_secs
    );

    let result = compiler
        .compile_manuscript(&manuscript, Duration::from_secs(timeout_secs))
        .await
        .map_err(TexdraftError::from)?;
    let status = result.status();
    let session = session.record_compile(result);

    match (status, session.preview(), session.last_failure()) {
        (CompileStatus::Success, Some(preview), _) => {
            std::fs::create_dir_all(out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            let target = out.join(&preview.filename);
            std::fs::write(&target, &preview.bytes)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            println!("Compiled successfully: {}", target.display());
            println!("{}", session.status_line());
            Ok(EXIT_SUCCESS)
        }
        (_, _, Some(failure)) => {
            match failure.status {
                CompileStatus::Failure => eprintln!("Compilation failed. Build log:"),
                CompileStatus::Timeout => eprintln!("Compilation timed out."),
                _ => eprintln!("Build tool error:"),
            }
            eprintln!("{}", failure.diagnostics);
            Ok(EXIT_COMPILE_FAILED)
        }
        _ => anyhow::bail!("compile finished with status {status} but left no result"),
    }
}

/// Count PDF pages
fn cmd_pages(pdf: &Path) -> Result<u8> {
    let bytes = std::fs::read(pdf).with_context(|| format!("Failed to read {}", pdf.display()))?;
    println!("{}", count_pages(&bytes));
    Ok(EXIT_SUCCESS)
}

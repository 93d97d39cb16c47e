use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Once};

use anyhow::Context;
use clap::{Parser, Subcommand};
use livelocals_core::{Frame, LiveLocals, livelocals};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

mod command;
mod frame_file;
mod repl;

use command::{Command, format_value};
use frame_file::FrameSpec;

static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "livelocals_core=info,livelocals_cli=info";

#[derive(Debug, Parser)]
#[command(
    name = "livelocals",
    author,
    version,
    about = "Drive a live mapping over a frame's local, cell and free variables",
    long_about = None
)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the assigned variables of a frame file in declared order.
    Show {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
        /// Print a JSON object instead of `name = value` lines
        #[arg(long)]
        json: bool,
    },
    /// Run mapping commands against a frame, one per line.
    Run {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
        /// Command to run; may be repeated
        #[arg(short = 'e', long = "exec", value_name = "CMD")]
        exec: Vec<String>,
        /// File with one command per line, run after any `-e` commands
        #[arg(long, value_name = "PATH", value_parser = parse_sanitized_path)]
        script: Option<PathBuf>,
        /// Report failing commands and continue instead of stopping
        #[arg(long)]
        keep_going: bool,
    },
    /// Interactive mapping commands over a frame.
    Repl {
        #[arg(value_name = "FILE", value_parser = parse_sanitized_path)]
        file: PathBuf,
    },
}

fn sanitize_path(raw: &str) -> anyhow::Result<PathBuf> {
    let p = Path::new(raw);

    for comp in p.components() {
        if matches!(comp, Component::ParentDir) {
            return Err(anyhow::anyhow!(
                "Parent directory components ('..') are not allowed in file paths."
            ));
        }
    }

    Ok(p.to_path_buf())
}

fn parse_sanitized_path(raw: &str) -> Result<PathBuf, String> {
    sanitize_path(raw).map_err(|e| e.to_string())
}

fn init_tracing() {
    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let builder = fmt().with_writer(std::io::stderr);

        let builder = match std::env::var("RUST_LOG").ok().and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

/// Serializes a mapping's items as a JSON object in declared order.
struct ItemsJson<'a>(&'a LiveLocals);

impl Serialize for ItemsJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.0.items() {
            map.serialize_entry(name.as_ref(), &value)?;
        }
        map.end()
    }
}

fn show(frame: &Arc<Frame>, json: bool) -> anyhow::Result<()> {
    let ll = livelocals(Some(frame))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ItemsJson(&ll))?);
    } else {
        for (name, value) in ll.items() {
            println!("{} = {}", name, format_value(&value));
        }
    }
    Ok(())
}

/// `-e` commands first, then the script's lines. Blank lines and `#` comments
/// are skipped.
fn collect_commands(exec: Vec<String>, script: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let mut lines = exec;
    if let Some(path) = script {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script '{}'", path.display()))?;
        lines.extend(src.lines().map(str::to_string));
    }
    lines.retain(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    });
    Ok(lines)
}

fn run_commands(frame: &Arc<Frame>, lines: &[String], keep_going: bool) -> anyhow::Result<()> {
    let ll = livelocals(Some(frame))?;
    let mut failed = 0usize;
    for line in lines {
        let result = line
            .parse::<Command>()
            .and_then(|cmd| cmd.execute(&ll))
            .with_context(|| format!("command `{}` failed", line.trim()));
        match result {
            Ok(out) => out.iter().for_each(|l| println!("{}", l)),
            Err(e) if keep_going => {
                eprintln!("Error: {:#}", e);
                failed += 1;
            }
            Err(e) => return Err(e),
        }
    }
    debug!(commands = lines.len(), failed, "run finished");
    if failed > 0 {
        anyhow::bail!("{} of {} commands failed", failed, lines.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let CliArgs { command } = CliArgs::parse();
    match command {
        Commands::Show { file, json } => {
            let frame = FrameSpec::load(&file)?.build()?;
            show(&frame, json)
        }
        Commands::Run {
            file,
            exec,
            script,
            keep_going,
        } => {
            let frame = FrameSpec::load(&file)?.build()?;
            let lines = collect_commands(exec, script.as_deref())?;
            run_commands(&frame, &lines, keep_going)
        }
        Commands::Repl { file } => {
            let frame = FrameSpec::load(&file)?.build()?;
            repl::run(frame)
        }
    }
}

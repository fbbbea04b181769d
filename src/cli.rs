use crate::config::load_config;
use crate::engine::{handle_organize, handle_pipeline, handle_reroute};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "flowtab", version, about = "Column layout and link rerouting for workflow graphs")]
pub struct Args {
    /// Input workflow JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Action to run against the graph
    #[arg(short = 'a', long = "action", value_enum, default_value = "organize")]
    pub action: Action,

    /// Config JSON file overriding layout constants
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Pretty-print the JSON response
    #[arg(long = "pretty")]
    pub pretty: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Action {
    /// Compute a fresh column layout
    Organize,
    /// Detect link/node overlaps at the given positions
    Reroute,
    /// Layout, overlap resolution and reindex in one pass
    Pipeline,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;

    let rendered = match args.action {
        Action::Organize => to_json(&handle_organize(&input, &config), args.pretty)?,
        Action::Reroute => to_json(&handle_reroute(&input, &config), args.pretty)?,
        Action::Pipeline => to_json(&handle_pipeline(&input, &config), args.pretty)?,
    };
    write_output(&rendered, args.output.as_deref())
}

fn to_json<T: Serialize>(response: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    Ok(rendered)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, rendered)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organize_is_the_default_action() {
        let args = Args::parse_from(["flowtab", "-i", "graph.json"]);
        assert!(matches!(args.action, Action::Organize));
        assert!(!args.pretty);
    }

    #[test]
    fn action_names_parse() {
        let args = Args::parse_from(["flowtab", "--action", "pipeline"]);
        assert!(matches!(args.action, Action::Pipeline));
    }
}

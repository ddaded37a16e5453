//! Command-line argument parsing for the driver binary.
//!
//! A small hand-written positional/flag parser rather than a
//! parser-combinator crate: the surface is four flags and two positional
//! slots, not worth a dependency. Modeled on `ToolMain.cpp`'s own minimal
//! argument handling (`argv[argc - 1]` for the heuristic, everything else
//! forwarded to `CommonOptionsParser`).

use std::path::PathBuf;

use smol_str::SmolStr;

use crate::core::error::CliError;
use crate::core::{FusionConfig, Heuristic};

const FLAG_MAX_MERGED_F: &str = "--max-merged-f";
const FLAG_MAX_MERGED_N: &str = "--max-merged-n";

/// Parsed driver invocation: a compilation database, the source files to
/// fuse, and the fusion caps/heuristic to run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub compile_commands: PathBuf,
    pub sources: Vec<PathBuf>,
    pub config: FusionConfig,
}

/// Parses `argv[1..]`: `<compile_commands.json> <source>... [--max-merged-f N] [--max-merged-n N] <heuristic>`.
pub fn parse_args<I, S>(args: I) -> Result<Args, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
    if tokens.is_empty() {
        return Err(CliError::MissingArgument("compile_commands"));
    }

    let mut config = FusionConfig::default();
    let mut positionals = Vec::new();
    let mut iter = tokens.into_iter().peekable();

    while let Some(tok) = iter.next() {
        if let Some(flag) = tok.strip_prefix("--") {
            let flag_name = format!("--{flag}");
            match flag_name.as_str() {
                FLAG_MAX_MERGED_F => {
                    let value = iter.next().ok_or(CliError::MissingArgument("--max-merged-f"))?;
                    config.max_merged_nodes = parse_u32(&flag_name, &value)?;
                }
                FLAG_MAX_MERGED_N => {
                    let value = iter.next().ok_or(CliError::MissingArgument("--max-merged-n"))?;
                    config.max_merged_instances = parse_u32(&flag_name, &value)?;
                }
                _ => return Err(CliError::UnknownFlag(SmolStr::new(&flag_name))),
            }
        } else {
            positionals.push(tok);
        }
    }

    if positionals.is_empty() {
        return Err(CliError::MissingArgument("compile_commands"));
    }
    let heuristic_name = positionals.pop().expect("checked non-empty above");
    config.heuristic = Heuristic::parse(&heuristic_name)
        .ok_or_else(|| CliError::UnknownHeuristic(SmolStr::new(&heuristic_name)))?;

    if positionals.is_empty() {
        return Err(CliError::MissingArgument("compile_commands"));
    }
    let compile_commands = PathBuf::from(positionals.remove(0));
    let sources: Vec<PathBuf> = positionals.into_iter().map(PathBuf::from).collect();
    if sources.is_empty() {
        return Err(CliError::MissingArgument("sources"));
    }

    Ok(Args { compile_commands, sources, config })
}

fn parse_u32(flag: &str, value: &str) -> Result<u32, CliError> {
    value.parse::<u32>().map_err(|_| CliError::InvalidValue {
        flag: match flag {
            FLAG_MAX_MERGED_F => "--max-merged-f",
            FLAG_MAX_MERGED_N => "--max-merged-n",
            _ => "unknown",
        },
        value: SmolStr::new(value),
    })
}

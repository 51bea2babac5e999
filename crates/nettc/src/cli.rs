//! Command-line parsing for the `nettc` binary.

use std::time::Duration;

use crate::config::{RunnerConfig, parse_timeout_ms, parse_value};
use crate::error::ConfigError;

pub const USAGE: &str = "\
Usage: nettc [CASE...] [--list] [--json] [--port <n>] [--timeout-ms <n>] [--resolve-host <host>]

Arguments:
  [CASE...]               Cases to run, in order [default: all]

Options:
  --list                  List available cases and exit
  --json                  Print the run report as JSON
  --port <n>              Port servers bind to, 0 for ephemeral [env: NETTC_PORT]
  --timeout-ms <n>        Rendezvous/accept/recv timeout [env: NETTC_WAIT_TIMEOUT_MS]
  --resolve-host <host>   Host the netdb case resolves [env: NETTC_RESOLVE_HOST]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Run,
    List,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: Action,
    pub cases: Vec<String>,
    pub json: bool,
    pub config: RunnerConfig,
}

/// Parse `args` (including argv[0]) on top of `config`.
pub fn parse_args(args: &[String], config: RunnerConfig) -> Result<Invocation, ConfigError> {
    let mut invocation = Invocation {
        action: Action::Run,
        cases: Vec::new(),
        json: false,
        config,
    };

    let mut args = args.iter().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--list" => invocation.action = Action::List,
            "--json" => invocation.json = true,
            "--help" | "-h" => {
                invocation.action = Action::Help;
                return Ok(invocation);
            }
            "--port" => {
                let value = required(&mut args, arg)?;
                invocation.config.port = parse_value(arg, value)?;
            }
            "--timeout-ms" => {
                let value = required(&mut args, arg)?;
                invocation.config.wait_timeout = parse_timeout_ms(arg, value)?;
            }
            "--resolve-host" => {
                let value = required(&mut args, arg)?;
                invocation.config.resolve_host = value.clone();
            }
            flag if flag.starts_with('-') => return Err(ConfigError::UnknownFlag(flag.to_string())),
            name => invocation.cases.push(name.to_string()),
        }
    }

    Ok(invocation)
}

fn required<'a>(
    args: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<&'a String, ConfigError> {
    args.next()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

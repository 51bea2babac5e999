use std::process::ExitCode;

use anyhow::Context;

use nettc::cli::{Action, USAGE, parse_args};
use nettc::{RunnerConfig, Suite};

fn main() -> ExitCode {
    nettc::logging::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    let invocation = match RunnerConfig::from_env().and_then(|config| parse_args(&args, config)) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(invocation) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether every selected case passed.
fn run(invocation: nettc::cli::Invocation) -> anyhow::Result<bool> {
    match invocation.action {
        Action::Help => {
            println!("{USAGE}");
            return Ok(true);
        }
        Action::List => {
            for case in Suite::builtin().cases() {
                println!("{:<12} {}", case.name, case.description);
            }
            return Ok(true);
        }
        Action::Run => {}
    }

    let suite = Suite::builtin()
        .select(invocation.cases.as_slice())
        .context("invalid case selection")?;

    tracing::info!("nettc {}", env!("CARGO_PKG_VERSION"));
    let report = suite.run(&invocation.config);

    if invocation.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    } else {
        print!("{}", report.summary());
    }

    Ok(report.all_passed())
}

use std::{process::ExitCode, time::SystemTime};

use clap::Parser;
use scopelog::{fields, Cause, RuntimeArgs};

/// Walks through conditional and unconditional outcome logging.
#[derive(Parser, Debug)]
#[command(name = "scopelog", version, about)]
struct Demo {
    /// Number of emit() calls per pass
    #[arg(short, long, default_value_t = 4)]
    count: u32,

    #[command(flatten)]
    logging: RuntimeArgs,
}

fn emit(i: u32) -> eyre::Result<()> {
    if i % 2 == 0 {
        eyre::bail!("Bad input");
    }
    Ok(())
}

fn run(demo: Demo) -> eyre::Result<()> {
    let count = demo.count;
    scopelog::configure(demo.logging.into());

    let logger = scopelog::shared_logger()
        .ok_or_else(|| eyre::eyre!("Failed creating logger for the configured destination"))?;

    logger
        .info()
        .print("Starting conditional", &fields!["time", SystemTime::now()])?;
    for i in 0..count {
        let outcome = emit(i);
        logger
            .on(outcome.err().map(Cause::report))
            .print("Problem with emit():", &fields!["i", i])?;
    }
    logger
        .info()
        .print("Finished conditional", &fields!["time", SystemTime::now()])?;

    logger
        .info()
        .print("Starting unconditional", &fields!["time", SystemTime::now()])?;
    for i in 0..count {
        let outcome = emit(i);
        logger
            .with(outcome.err().map(Cause::report))
            .print("Returned from emit():", &fields!["i", i])?;
    }
    logger
        .info()
        .print("Finished unconditional", &fields!["time", SystemTime::now()])?;

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let demo = Demo::parse();

    match run(demo) {
        Err(err) => {
            let root = err.root_cause();

            eprint!("\x1b[31m");
            eprintln!("Error: {}", err);
            eprintln!();
            eprintln!("Caused by:");
            eprint!("  {}", root);
            eprintln!("\x1b[0m");
            ExitCode::from(1)
        }
        Ok(_) => ExitCode::from(0),
    }
}

//! hostpool entry point.

use std::process::ExitCode;

use clap::Parser;

use hostpool_core::{TracingConfig, init_tracing};
use hostpool_server::cli::{Cli, Command};
use hostpool_server::{HostPool, ServerConfig, ServerResult, start_server};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut tracing = if cli.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::server()
    };
    if let Some(format) = cli.log_format {
        tracing = tracing.with_format(format);
    }
    if let Err(e) = init_tracing(tracing) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> ServerResult<ExitCode> {
    match command {
        Command::Serve { config, bind } => {
            let mut config = ServerConfig::load_from(&config.config)?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            start_server(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { config } => {
            let config = ServerConfig::load_from(&config.config)?;
            check(&HostPool::from_config(&config)?).await
        }
    }
}

async fn check(pool: &HostPool) -> ServerResult<ExitCode> {
    let mut failed = 0;
    for check in pool.check().await {
        match check.result {
            Ok(event_type) => println!("ok    {}  {}", check.host_id, event_type),
            Err(e) => {
                failed += 1;
                println!("FAIL  {}  {}", check.host_id, e);
                for url in e.seen_scheduling_urls() {
                    println!("        seen: {}", url);
                }
            }
        }
    }

    if failed == 0 {
        println!("\nall {} hosts resolved", pool.hosts().len());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("\n{} of {} hosts failed", failed, pool.hosts().len());
        Ok(ExitCode::FAILURE)
    }
}

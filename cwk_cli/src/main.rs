use std::io::Read;
use std::process::ExitCode;

use clap::Parser;
use cwk_model::response::ErrorResponse;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

use cwk_cli::Cli;

fn init_tracing() {
    let (appender, guard) = tracing_appender::non_blocking(std::io::stderr());
    // Leak the guard: the worker is a short-lived, single-invocation process, so there is no
    // later point at which flushing on drop would matter.
    std::mem::forget(guard);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(appender)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> ExitCode {
    let _ = Cli::parse();
    init_tracing();

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        return fail(None, cwk_app::Error::InputParseError(e.to_string()));
    }

    match cwk_cli::run(&input) {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(failure) => fail(failure.command, failure.error),
    }
}

fn fail(command: Option<String>, error: cwk_app::Error) -> ExitCode {
    tracing::warn!(?command, %error, "request failed");
    let response = ErrorResponse {
        status: "error".to_string(),
        command,
        message: error.to_string(),
        stack: error.tag().to_string(),
    };
    match serde_json::to_string(&response) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(r#"{{"status":"error","message":"failed to serialize error"}}"#),
    }
    ExitCode::FAILURE
}

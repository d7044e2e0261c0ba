use clap::Parser;

/// Signs one transaction and exits. Reads a single JSON request document from standard input,
/// writes a single JSON response to standard output on success or to standard error on failure.
///
/// Offline, air-gapped operation: no network access, no flags affect cryptographic behaviour.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli;

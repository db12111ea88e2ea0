//! DVH CLI binary.
//!
//! Entry point for the `dvh` command: initializes logging, parses
//! arguments, and drives the pipeline to completion, translating any
//! failure into the nonzero exit code its kind maps to (spec §6/§7).

mod cli;
mod commands;
mod exit;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if args.verbose { "debug" } else { "warn" })
            }),
        )
        .init();

    if let Err(err) = commands::dispatch(args).await {
        let code = exit::code_for(&err);
        let report: miette::Report = err.into();
        eprintln!("{report:?}");
        std::process::exit(code);
    }
}

use clap::Parser;
use recon::cli::commands;
use recon::cli::{Cli, Commands};
use recon::config;
use recon::logging::init_logging;
use recon::output::OutputContext;
use recon::{ReconError, StructuredError};
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = build_cli_overrides(&cli);
    let ctx = OutputContext::from_flags(cli.json, cli.quiet, cli.no_color);

    let result = match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, None, &ctx),
        Commands::Create(args) => commands::create::execute(args, &overrides, &ctx),
        Commands::List(args) => commands::list::execute(args, &overrides, &ctx),
        Commands::Show { id, timeline } => {
            commands::show::execute(id, *timeline, &overrides, &ctx)
        }
        Commands::Update(args) => commands::update::execute(args, &overrides, &ctx),
        Commands::Archive { ids } => commands::archive::execute(ids, &overrides, &ctx),
        Commands::Event(args) => commands::event::execute(args, &overrides, &ctx),
        Commands::Timeline(args) => commands::timeline::execute(args, &overrides, &ctx),
        Commands::Stats(args) => commands::stats::execute(args, &overrides, &ctx),
        Commands::Export(args) => commands::export::execute(args, &overrides, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Version => commands::version::execute(&ctx),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

fn handle_error(err: &ReconError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    // JSON if --json or stdout is piped
    if json_mode || !io::stdout().is_terminal() {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        eprintln!("{}", structured.to_human(io::stderr().is_terminal()));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        db: cli.db.clone(),
        actor: cli.actor.clone(),
        lock_timeout: cli.lock_timeout,
    }
}

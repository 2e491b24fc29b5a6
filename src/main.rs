// ABOUTME: CLI entrypoint for hexport command
// ABOUTME: Handles error exit codes and command dispatch

use clap::Parser;
use hexport::{
    api::ApiClient,
    auth::resolve_credentials,
    cli::{Cli, Commands},
    config::Settings,
    export::{export_all, notebook_paths},
    Result,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("hexport: [E{}] {}", e.exit_code(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?.apply_cli(&cli);

    let mut client = ApiClient::new(Some(settings.api_base.clone()))?;
    if cli.no_throttle {
        client = client.disable_throttle();
    } else if let Some((min, max)) = cli.throttle_ms {
        client = client.with_throttle(min, max);
    }

    let credentials = resolve_credentials(&settings)?;
    let session = client.login(&credentials.email, &credentials.password)?;
    println!(
        "Login success, welcome {} ({}).",
        session.username.as_deref().unwrap_or("?"),
        session.email.as_deref().unwrap_or(&credentials.email)
    );

    match cli.command() {
        Commands::Export => {
            export_all(&client, &settings)?;
        }
        Commands::Notebooks => {
            let (_, table) = notebook_paths(&client)?;
            for (id, segments) in table.iter() {
                println!("{}\t{}", id, segments.join("/"));
            }
        }
    }

    Ok(())
}

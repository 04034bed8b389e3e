use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;

use tou_gate::config::{get_config_path, Config};
use tou_gate::logger;
use tou_gate::modal::TouModal;
use tou_gate::render::render_state;
use tou_gate::tou::{BlockRules, GateState, PendingFetch, TouClient, TouGate};

#[derive(Parser, Debug)]
#[command(name = "tou_gate", version, about = "Show the Terms of Use and record acceptance")]
struct Cli {
    /// Path to config.toml (defaults to config/config.toml next to the binary)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend origin, overrides config and TOU_API_BASE
    #[arg(long)]
    api_base: Option<String>,

    /// Fetch and print the terms to stdout instead of opening a window
    #[arg(long)]
    print: bool,

    /// List stored TOU versions and exit
    #[arg(long)]
    history: bool,

    /// Forget a previous acceptance and exit
    #[arg(long)]
    reset: bool,

    /// Show the terms even if they were already accepted
    #[arg(long)]
    force: bool,

    /// Show a specific TOU version instead of the active one
    #[arg(long = "version-number")]
    version_number: Option<i64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let mut config = Config::try_load_from(&config_path)?.unwrap_or_default();

    if let Err(e) = logger::init(config.general.debug) {
        eprintln!("[!] Logging disabled: {}", e);
    }
    log::info!("[Main] Config path: {:?}", config_path);

    if cli.reset {
        config.clear_acceptance();
        config.save_to(&config_path)?;
        println!("[*] Stored acceptance cleared.");
        return Ok(());
    }

    // 2. Backend client
    let api_base = cli
        .api_base
        .clone()
        .unwrap_or_else(|| config.effective_api_base());
    let bullet = config.content.bullet_char()?;
    let rules = BlockRules::new(bullet);
    let client = TouClient::new(&api_base, &config.http)
        .context("Failed to set up the Terms of Use client")?;
    log::info!("[Main] API base: {}", client.api_base());

    if cli.history {
        return print_history(&client);
    }

    if cli.print {
        return print_terms(&client, rules, &config, cli.version_number);
    }

    if config.general.tou_accepted && !cli.force && cli.version_number.is_none() {
        println!(
            "[*] Terms of Use already accepted (version {:?}, at {}).",
            config.general.tou_accepted_version,
            config.general.tou_accepted_at.as_deref().unwrap_or("unknown time")
        );
        return Ok(());
    }

    // 3. Show the gate
    let accepted = Rc::new(Cell::new(false));
    let on_accept = {
        let accepted = accepted.clone();
        move || accepted.set(true)
    };
    let gate = TouGate::new(rules, config.content.agreement_text.clone(), on_accept);
    let pending = PendingFetch::start(client.clone(), cli.version_number);
    let outcome = TouModal::new(gate, pending, bullet).show("Terms of Use")?;

    if !accepted.get() {
        log::info!("[Main] Window closed without acceptance");
        anyhow::bail!("Terms of Use were not accepted");
    }

    // 4. Persist
    config.mark_accepted(outcome.version);
    config
        .save_to(&config_path)
        .context("Failed to store Terms of Use acceptance")?;
    println!("[*] Terms of Use accepted.");

    if let (Some(email), Some(version)) = (config.general.email.clone(), outcome.version) {
        // The fetch client's pool belonged to the worker's runtime, so start clean.
        let client = TouClient::new(&api_base, &config.http)?;
        record_remote_acceptance(&client, &email, version);
    }

    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

fn print_terms(
    client: &TouClient,
    rules: BlockRules,
    config: &Config,
    version: Option<i64>,
) -> Result<()> {
    let outcome = runtime()?.block_on(async {
        match version {
            Some(v) => client.fetch_version(v).await,
            None => client.fetch_active().await,
        }
    });

    let mut gate = TouGate::new(rules, config.content.agreement_text.clone(), || {});
    gate.resolve(outcome);
    print!("{}", render_state(gate.state(), false, rules.bullet()));

    if let GateState::Failed(message) = gate.state() {
        anyhow::bail!("{}", message);
    }
    Ok(())
}

fn print_history(client: &TouClient) -> Result<()> {
    let history = runtime()?.block_on(client.fetch_history())?;
    if history.is_empty() {
        println!("No Terms of Use versions stored.");
    }
    for entry in history {
        println!(
            "v{}{}  created {}  by {}",
            entry.version,
            if entry.is_active { " (active)" } else { "" },
            entry.created_at.as_deref().unwrap_or("-"),
            entry.created_by.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

// Local acceptance is already stored; a backend failure here only gets logged.
fn record_remote_acceptance(client: &TouClient, email: &str, version: i64) {
    let result = runtime().map(|rt| rt.block_on(client.record_acceptance(email, version)));
    match result {
        Ok(Ok(receipt)) => {
            log::info!("[Main] Acceptance recorded server-side (id {})", receipt.id);
        }
        Ok(Err(e)) => {
            log::warn!("[Main] Could not record acceptance server-side: {}", e);
            eprintln!("[!] Could not record acceptance on the server: {}", e);
        }
        Err(e) => {
            log::warn!("[Main] {}", e);
        }
    }
}

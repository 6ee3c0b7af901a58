//! Caution engine reference demo CLI
//!
//! Runs one or all of the reference scenarios, or checks a TOML rule file.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- person-intake
//!   cargo run -p demo -- pet-checkout
//!   cargo run -p demo -- talking-pet
//!   cargo run -p demo -- check-rules crates/caution-ref-pets/rules/pet.toml

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use caution_contracts::CautionResult;
use caution_ref_pets::scenarios::{person_intake, pet_checkout, talking_pet};
use caution_rules::RuleSet;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Non-fatal warnings for records: reference demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Caution engine reference demo",
    long_about = "Runs the reference scenarios showing passive and active warnings,\n\
                  callbacks, derived registries and the confirmation gate."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// Scenario 1: Person intake (passive warnings, conditions, ensure_safe).
    PersonIntake,
    /// Scenario 2: Pet checkout (active warnings and confirmation).
    PetCheckout,
    /// Scenario 3: Talking pet (callbacks and derived registries).
    TalkingPet,
    /// Parse a TOML rule file and list its declarations.
    CheckRules {
        /// Path to the rule file.
        path: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to watch each caution run.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::PersonIntake => person_intake::run_scenario(),
        Command::PetCheckout => pet_checkout::run_scenario(),
        Command::TalkingPet => talking_pet::run_scenario(),
        Command::CheckRules { path } => check_rules(path),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_all() -> CautionResult<()> {
    print_banner();
    person_intake::run_scenario()?;
    pet_checkout::run_scenario()?;
    talking_pet::run_scenario()?;
    println!("All scenarios completed.");
    Ok(())
}

fn check_rules(path: PathBuf) -> CautionResult<()> {
    let rules = RuleSet::from_file(&path)?;
    info!(path = %path.display(), declarations = rules.declarations().len(), "rule file parsed");

    println!("{}: {} declaration(s)", path.display(), rules.declarations().len());
    for declaration in rules.declarations() {
        let kinds: Vec<&str> = declaration.rules.iter().map(|r| r.kind.tag()).collect();
        println!(
            "  {} -> {}",
            declaration.attributes.join(", "),
            kinds.join(", ")
        );
    }
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Cautions: non-fatal warnings for records");
    println!("========================================");
    println!();
    println!("Per run:");
    println!("  [1] before callbacks (may halt the run)");
    println!("  [2] cautioners and caution methods, in declaration order");
    println!("  [3] after callbacks");
    println!("Warnings never make a record invalid, except active warnings");
    println!("that have not been confirmed yet.");
    println!();
}

//! Scenario 1: Person intake form
//!
//! A receptionist types in a new person. None of the warnings stop the
//! record from being used; they are shown next to the form:
//!
//! - a short phone number (record-level warning)
//! - an age that is not a number, a height that is not plausible
//! - Scooby gang members who must say whether they like Scooby Snacks

use serde_json::json;

use caution_contracts::{CautionError, CautionResult};
use caution_core::Cautionable;

use crate::person::Person;

use super::print_warnings;

pub fn run_scenario() -> CautionResult<()> {
    println!("=== Scenario 1: Person Intake ===");
    println!();

    // ── A: clean record ──────────────────────────────────────────────────────

    let mut person = Person::named("Daphne");
    person.tel = Some("07700900123".to_string());
    person.likes_scooby_snacks = Some(false);
    person.age = json!(19);
    println!("  A: Daphne, full phone number, age 19, does not like Scooby Snacks");
    let safe = person.is_safe(None)?;
    println!("    safe: {safe}");
    print_warnings(&person);
    println!();

    // ── B: sloppy input ──────────────────────────────────────────────────────

    let mut person = Person::named("Fred");
    person.tel = Some("555-0199".to_string());
    person.age = json!("very old");
    person.height_in_inches = json!(500);
    person.likes_scooby_snacks = Some(true);
    println!("  B: Fred, short phone number, age \"very old\", 500 inches tall");
    let safe = person.is_safe(None)?;
    println!("    safe: {safe}");
    print_warnings(&person);
    println!();

    // ── C: ensure_safe refuses ───────────────────────────────────────────────

    println!("  C: the same record through ensure_safe");
    match person.ensure_safe(None) {
        Ok(()) => println!("    accepted"),
        Err(CautionError::Unsafe { message, .. }) => println!("    refused: {message}"),
        Err(other) => return Err(other),
    }
    println!();

    println!(
        "  Warnings as JSON: {}",
        person.warnings().to_json(true)
    );
    println!();
    Ok(())
}

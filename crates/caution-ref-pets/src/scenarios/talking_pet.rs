//! Scenario 3: Talking pet
//!
//! Callbacks around the cautioning pass:
//!
//! - the before callback gives a silent pet its default greeting
//! - a dog with a cat's greeting trips the dog-only rule
//! - the after callback fails the whole run when the pet talks

use caution_contracts::{CautionError, CautionResult};
use caution_core::Cautionable;

use crate::pet::Pet;

use super::print_warnings;

pub fn run_scenario() -> CautionResult<()> {
    println!("=== Scenario 3: Talking Pet ===");
    println!();

    let mut pet = Pet::named("Scooby").with_category("Dog");
    println!("  A: a dog with no greeting");
    let safe = pet.is_safe(None)?;
    println!(
        "    safe: {safe}, greeting learned: {}",
        pet.greeting.as_deref().unwrap_or_default()
    );
    println!();

    let mut pet = Pet::named("Scrappy2").with_category("Dog").with_greeting("Meow");
    println!("  B: a dog that meows and has a number in its name");
    let safe = pet.is_safe(None)?;
    println!("    safe: {safe}");
    print_warnings(&pet);
    println!();

    let mut pet = Pet::named("Astro").with_greeting("Hello there, friend!");
    println!("  C: a pet that says \"Hello there, friend!\"");
    match pet.is_safe(None) {
        Err(CautionError::Callback { name, reason }) => {
            println!("    run aborted by {name}: {reason}");
        }
        other => {
            println!("    unexpected outcome: {other:?}");
        }
    }
    println!();
    Ok(())
}

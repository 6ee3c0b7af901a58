//! Scenario 2: Pet checkout
//!
//! A pet leaving the shelter raises an *active* warning. Saving is refused
//! until a member of staff confirms it:
//!
//! Sub-case A: save without confirmation  → refused, base error shown
//! Sub-case B: staff rejects the warning  → still refused
//! Sub-case C: staff accepts the warning  → saved, warnings still listed
//! Sub-case D: a bulk import skips the gate for one check

use chrono::{Duration, Utc};

use caution_contracts::CautionResult;
use caution_core::{Cautionable, HostValidation};

use crate::pet::Pet;

use super::print_warnings;

fn ben() -> Pet {
    Pet::named("Ben")
        .with_category("Dog")
        .with_status("out")
        .with_birthdate(Utc::now().date_naive() + Duration::days(31))
}

pub fn run_scenario() -> CautionResult<()> {
    println!("=== Scenario 2: Pet Checkout ===");
    println!();

    let mut pet = ben();

    println!("  Sub-case A: save Ben while he is checking out");
    let saved = pet.save()?;
    println!("    saved: {saved} (state: {:?})", pet.safety_state());
    for error in pet.errors().base() {
        println!("    error: {error}");
    }
    print_warnings(&pet);
    println!();

    println!("  Sub-case B: staff rejects the checkout");
    pet.set_confirm_decision(false);
    let saved = pet.save()?;
    println!("    saved: {saved} (state: {:?})", pet.safety_state());
    println!();

    println!("  Sub-case C: staff accepts the checkout");
    pet.set_confirm_decision(true);
    let saved = pet.save()?;
    println!("    saved: {saved} (state: {:?})", pet.safety_state());
    let safe = pet.is_safe(None)?;
    println!("    still safe? {safe}");
    print_warnings(&pet);
    println!();

    println!("  Sub-case D: bulk import ignores unconfirmed warnings");
    let mut imported = ben();
    let valid = imported.valid_ignoring_unconfirmed_active_warnings(None)?;
    println!(
        "    valid: {valid}, needs confirmation: {}",
        imported.warnings_need_confirmation()
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_runs() {
        run_scenario().unwrap();
    }
}

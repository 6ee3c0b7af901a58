//! Walkthroughs for the demo CLI.
//!
//! Each scenario builds records from scratch, runs them through the caution
//! engine, and prints what a host application would show its user.

pub mod person_intake;
pub mod pet_checkout;
pub mod talking_pet;

use caution_core::Cautionable;

/// Print every warning of `record` as an indented list.
fn print_warnings<R: Cautionable>(record: &R) {
    let warnings = record.warnings();
    if warnings.is_empty() {
        println!("    (no warnings)");
        return;
    }
    let active = warnings.active_messages();
    for message in warnings.full_messages() {
        let marker = if active.contains(&message) { "!" } else { "-" };
        println!("    {marker} {message}");
    }
}

#[path = "property/tension_bounds.rs"]
mod tension_bounds;

#[path = "property/synthesis_invariants.rs"]
mod synthesis_invariants;

#[path = "property/identity_history.rs"]
mod identity_history;

#[path = "adversarial/invariant_attack.rs"]
mod invariant_attack;

#[path = "adversarial/gate_bypass.rs"]
mod gate_bypass;

#[path = "adversarial/hostile_advisors.rs"]
mod hostile_advisors;

#![deny(unsafe_code)]
//! Concord demo binary.
//!
//! Runs a self-contained demonstration of:
//! 1. Engine initialisation from a seeded identity
//! 2. A short stream of experiences through the advisory council
//! 3. Input validation
//! 4. A drift check routed through the approval gate
//! 5. The growth snapshot
//!
//! No external services required: advisors, escalator, ledger and approval
//! gate are all simulated. Set `RUST_LOG` to change log verbosity.

mod workload;

use anyhow::Context;
use concord_engine::{ChangeOutcome, ConcordEngine, CycleRecord, DriftCheckOutcome, EngineConfig, RepairOutcome};
use concord_governance::SimulatedApprovalGate;
use concord_synthesis::SimulatedEscalator;
use concord_types::Experience;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

const BANNER: &str = r#"
 ╔═══════════════════════════════════════════════════════════════╗
 ║                 Concord  --  Demo                             ║
 ║                                                               ║
 ║   Five advisors, one decision, a protected identity.          ║
 ╚═══════════════════════════════════════════════════════════════╝
"#;

fn section(title: &str) {
    let width: usize = 60;
    let pad = width.saturating_sub(title.len() + 4);
    let left = pad / 2;
    let right = pad - left;
    println!();
    println!(" ┌{}┐", "─".repeat(width));
    println!(" │{}  {}  {}│", " ".repeat(left), title, " ".repeat(right));
    println!(" └{}┘", "─".repeat(width));
    tracing::debug!(phase = title, "demo phase");
}

fn ok(msg: &str) {
    println!("   [OK]  {}", msg);
}

fn info(msg: &str) {
    println!("   [--]  {}", msg);
}

fn warn(msg: &str) {
    println!("   [!!]  {}", msg);
}

/// Filter used when `RUST_LOG` is unset or unparsable.
fn fallback_filter() -> EnvFilter {
    EnvFilter::default().add_directive(Level::INFO.into())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback_filter()),
        )
        .with_target(false)
        .with_level(true)
        .init();

    println!("{}", BANNER);

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "concord.toml".into());
    let config = EngineConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    tracing::info!(config = %config_path, "starting demo");
    run_demo(config).await?;

    println!();
    println!(" ════════════════════════════════════════════════════════════════");
    println!("  Demo complete.");
    println!(" ════════════════════════════════════════════════════════════════");
    println!();
    Ok(())
}

async fn run_demo(config: EngineConfig) -> anyhow::Result<()> {
    section("Phase A: Engine Initialisation");

    info(&format!(
        "advisor timeout {}ms  tension threshold {:.2}  escalation threshold {:.2}",
        config.advisor_timeout_ms, config.tension_threshold, config.escalation_threshold
    ));
    let engine = ConcordEngine::new(config, workload::demo_council(), workload::demo_identity())?
        .with_escalator(Arc::new(SimulatedEscalator::new()))
        .with_approval_gate(Arc::new(SimulatedApprovalGate::permissive()));
    let identity = engine.get_identity();
    ok(&format!(
        "Identity online  version={}  invariants={}  flexible={}",
        identity.version,
        identity.invariants.len(),
        identity.flexible.len()
    ));

    section("Phase B: Experience Stream");

    let stream = workload::experiences();
    let total = stream.len();
    for (i, experience) in stream.into_iter().enumerate() {
        let label = format!("Cycle {}/{}", i + 1, total);
        match engine.process_cycle(experience).await {
            Ok(record) => print_cycle(&label, &record),
            Err(e) => warn(&format!("{label}  failed: {e}")),
        }
    }

    section("Phase C: Validation");

    match engine.process(Experience::new("   ", "demo", "participant-1")).await {
        Ok(_) => warn("blank experience was accepted"),
        Err(e) => ok(&format!("blank experience refused: {e}")),
    }

    section("Phase D: Drift Check");

    // persistence is fire-and-forget; let the ledger writes land
    tokio::task::yield_now().await;
    match engine.run_drift_check().await? {
        DriftCheckOutcome::NoHistory => info("ledger is empty"),
        DriftCheckOutcome::Clean { window } => {
            ok(&format!("no drift across {window} decisions, stable values checkpointed"))
        }
        DriftCheckOutcome::Drifted { report, repairs } => {
            warn(&format!(
                "drift {:.3} on {:?}  coherence {:.3}",
                report.deviation, report.affected, report.coherence
            ));
            for repair in &repairs {
                print_repair(repair);
            }
        }
    }

    section("Phase E: Growth");

    let growth = engine.get_growth();
    let c = &growth.counters;
    info(&format!("Snapshot           : #{}", growth.sequence));
    info(&format!("Decisions processed: {}", c.decisions_processed));
    info(&format!("Escalations        : {} ({} failed)", c.escalations_triggered, c.escalation_failures));
    info(&format!("Changes applied    : {}", c.changes_applied));
    info(&format!("Changes rejected   : {}", c.changes_rejected));
    info(&format!("Drift events       : {}", c.drift_events));
    info(&format!("Abstentions        : {}", c.abstentions));
    info(&format!("Trend              : {}", growth.trend));
    let d = &growth.development;
    info(&format!(
        "Development        : {:.3} (confidence {:.2} over {} decisions, {:.0}% escalated)",
        d.level,
        d.confidence,
        d.samples,
        d.breakdown.escalation_rate * 100.0
    ));
    for m in &growth.new_milestones {
        ok(&format!("Milestone: first {} (event #{})", m.kind, m.event_ordinal));
    }

    let identity = engine.get_identity();
    ok(&format!(
        "Identity version {}  communication_style={}",
        identity.version,
        identity
            .get("communication_style")
            .map(|v| v.to_string())
            .unwrap_or_default()
    ));
    Ok(())
}

fn print_cycle(label: &str, record: &CycleRecord) {
    let d = &record.decision;
    let top = record
        .tensions
        .iter()
        .find(|t| t.active)
        .map(|t| format!("{} {:.2}", t.axis.label, t.magnitude))
        .unwrap_or_else(|| "none".into());
    info(&format!(
        "{label}  {:<9} confidence={:.2} aggregate={:.2} tension={}",
        d.mode, d.confidence, d.aggregate, top
    ));
    if d.escalation_failed {
        warn(&format!("{label}  escalation failed, heuristic used"));
    }
    match &record.change {
        ChangeOutcome::NoChange => {}
        ChangeOutcome::Applied { key, version } => {
            ok(&format!("{label}  applied '{key}' -> version {version}"))
        }
        ChangeOutcome::Rejected { key, reason } => warn(&format!("{label}  rejected '{key}': {reason}")),
    }
}

fn print_repair(repair: &RepairOutcome) {
    match repair {
        RepairOutcome::Applied { key, version } => ok(&format!("repaired '{key}' -> version {version}")),
        RepairOutcome::Pending { key, request_id } => {
            info(&format!("repair of '{key}' awaiting approval ({request_id})"))
        }
        other => warn(&format!("repair of '{}' not applied: {:?}", other.key(), other)),
    }
}

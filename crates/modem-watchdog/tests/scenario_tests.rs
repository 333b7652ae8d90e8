//! End-to-end controller scenarios on a paused clock.
//!
//! Timeline with the fast policy and a probe that always fails:
//! first probe at 10ms (-> investigating), window closes at 40ms
//! (-> resetting, power cut), power restored at 60ms (-> recovering),
//! recovery gives up at 160ms (-> resetting again).

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{RecordingSink, ScriptedProbe, controller, fast_policy, run_for};
use modem_watchdog::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

use State::{Investigating, Operating, Recovering, Resetting};

/// Scenario A: success, success, failure opens an investigation and nothing more.
#[tokio::test(start_paused = true)]
async fn scenario_single_failure_starts_investigation() -> TestResult {
    let probe = ScriptedProbe::new([true, true, false]);
    let relay = Arc::new(SoftwareRelay::new());
    let sink = RecordingSink::new();
    let mut controller = controller(probe.clone(), relay.clone(), sink.clone(), fast_policy())?;

    run_for(&mut controller, Duration::from_millis(42)).await;

    assert_eq!(sink.path(), vec![(Operating, Investigating)]);
    let snapshot = sink.snapshot();
    assert_eq!(snapshot.resets, 0);
    assert_eq!(snapshot.ping_success, 2);
    assert!(snapshot.ping_failure >= 1);
    assert_eq!(relay.calls().cut, 0);
    Ok(())
}

/// Scenario B: a success inside the confirmation window cancels the outage.
#[tokio::test(start_paused = true)]
async fn scenario_success_while_investigating_returns_to_operating() -> TestResult {
    let probe = ScriptedProbe::new([false, false, true]);
    let relay = Arc::new(SoftwareRelay::new());
    let sink = RecordingSink::new();
    let mut controller = controller(probe.clone(), relay.clone(), sink.clone(), fast_policy())?;

    run_for(&mut controller, Duration::from_millis(100)).await;

    assert_eq!(
        sink.path(),
        vec![(Operating, Investigating), (Investigating, Operating)]
    );
    assert_eq!(sink.snapshot().resets, 0);
    assert_eq!(relay.calls().cut, 0);
    assert_eq!(sink.snapshot().state, Operating);
    Ok(())
}

/// Scenario C: a sustained outage runs one full reset cycle.
#[tokio::test(start_paused = true)]
async fn scenario_sustained_outage_runs_one_reset_cycle() -> TestResult {
    let probe = ScriptedProbe::new([false]);
    let relay = Arc::new(SoftwareRelay::new());
    let sink = RecordingSink::new();
    let mut controller = controller(probe.clone(), relay.clone(), sink.clone(), fast_policy())?;

    run_for(&mut controller, Duration::from_millis(100)).await;

    assert_eq!(
        sink.path(),
        vec![
            (Operating, Investigating),
            (Investigating, Resetting),
            (Resetting, Recovering),
        ]
    );
    let calls = relay.calls();
    assert_eq!(calls.cut, 1);
    assert_eq!(calls.restore, 1);
    assert_eq!(sink.snapshot().resets, 1);
    assert!(!relay.is_power_cut());

    let times: Vec<Duration> = sink.transitions().iter().map(|t| t.at).collect();
    assert_eq!(
        times,
        vec![
            Duration::from_millis(10),
            Duration::from_millis(40),
            Duration::from_millis(60),
        ]
    );
    Ok(())
}

/// Scenario D: recovery that never comes triggers a second reset.
#[tokio::test(start_paused = true)]
async fn scenario_recovery_timeout_resets_again() -> TestResult {
    let probe = ScriptedProbe::new([false]);
    let relay = Arc::new(SoftwareRelay::new());
    let sink = RecordingSink::new();
    let mut controller = controller(probe.clone(), relay.clone(), sink.clone(), fast_policy())?;

    run_for(&mut controller, Duration::from_millis(170)).await;

    assert_eq!(
        sink.path(),
        vec![
            (Operating, Investigating),
            (Investigating, Resetting),
            (Resetting, Recovering),
            (Recovering, Resetting),
        ]
    );
    assert_eq!(sink.snapshot().resets, 2);
    assert_eq!(relay.calls().cut, 2);
    assert_eq!(
        sink.transitions().last().map(|t| t.at),
        Some(Duration::from_millis(160))
    );
    Ok(())
}

/// Scenario E: shutdown while power is cut restores power and stops.
#[tokio::test(start_paused = true)]
async fn scenario_shutdown_during_reset_restores_power() -> TestResult {
    let probe = ScriptedProbe::new([false]);
    let relay = Arc::new(SoftwareRelay::new());
    let sink = RecordingSink::new();
    let policy = TimingPolicy {
        reset_duration: Duration::from_secs(1),
        ..fast_policy()
    };
    let mut controller = controller(probe.clone(), relay.clone(), sink.clone(), policy)?;

    run_for(&mut controller, Duration::from_millis(100)).await;

    assert_eq!(
        sink.path(),
        vec![(Operating, Investigating), (Investigating, Resetting)]
    );
    assert!(relay.calls().restore >= 1);
    assert_eq!(relay.calls().cut, 1);
    assert!(!relay.is_power_cut());
    assert!(!sink.path().iter().any(|&(_, to)| to == Recovering));
    Ok(())
}

/// Connectivity returning after the power cycle ends the outage.
#[tokio::test(start_paused = true)]
async fn scenario_connectivity_returns_after_reset() -> TestResult {
    let relay = Arc::new(SoftwareRelay::new());
    let watched = relay.clone();
    let probe = Arc::new(common::FnProbe(move || watched.calls().restore > 0));
    let sink = RecordingSink::new();
    let mut controller = controller(probe, relay.clone(), sink.clone(), fast_policy())?;

    run_for(&mut controller, Duration::from_millis(200)).await;

    assert_eq!(
        sink.path(),
        vec![
            (Operating, Investigating),
            (Investigating, Resetting),
            (Resetting, Recovering),
            (Recovering, Operating),
        ]
    );
    // First probe in recovery is one ping interval after power returns.
    assert_eq!(
        sink.transitions().last().map(|t| t.at),
        Some(Duration::from_millis(70))
    );
    assert_eq!(sink.snapshot().resets, 1);
    assert_eq!(sink.snapshot().state, Operating);
    Ok(())
}

/// Healthy connectivity never counts a transition.
#[tokio::test(start_paused = true)]
async fn scenario_steady_operation_counts_no_transitions() -> TestResult {
    let probe = ScriptedProbe::new([true]);
    let relay = Arc::new(SoftwareRelay::new());
    let sink = RecordingSink::new();
    let mut controller = controller(probe.clone(), relay.clone(), sink.clone(), fast_policy())?;

    run_for(&mut controller, Duration::from_millis(995)).await;

    let snapshot = sink.snapshot();
    assert_eq!(snapshot.transitions, 0);
    assert_eq!(snapshot.ping_success, 99);
    assert_eq!(snapshot.ping_failure, 0);
    assert_eq!(probe.calls(), 99);
    assert_eq!(sink.published(), vec![Operating]);
    Ok(())
}

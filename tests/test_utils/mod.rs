//! Test Utilities
//!
//! Helpers shared by the integration tests. Tests that need a real
//! interpreter call [`config_for`] and return early when it yields `None`.

#![allow(dead_code)]

use linecast::{adapter_for, Config, ExecutionTurn, Language, LineEvent};
use std::time::Duration;

/// Upper bound for any single turn in tests
pub const TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// Test configuration, or `None` when no interpreter for `language` is
/// installed here
pub fn config_for(language: Language) -> Option<Config> {
    let mut config = Config::default();
    config.session.drain_grace_ms = 300;

    match adapter_for(language, &config) {
        Ok(_) => Some(config),
        Err(e) => {
            eprintln!("skipping {} test: {}", language, e);
            None
        }
    }
}

/// Drive a turn to its terminal event
pub async fn collect_events(mut turn: ExecutionTurn) -> Vec<LineEvent> {
    tokio::time::timeout(TURN_TIMEOUT, async move {
        let mut events = Vec::new();
        while let Some(event) = turn.next().await {
            events.push(event);
        }
        events
    })
    .await
    .expect("turn did not finish in time")
}

/// Next event of a turn, failing the test instead of hanging
pub async fn next_event(turn: &mut ExecutionTurn) -> Option<LineEvent> {
    tokio::time::timeout(TURN_TIMEOUT, turn.next())
        .await
        .expect("no event in time")
}

pub fn active_lines(events: &[LineEvent]) -> Vec<usize> {
    events.iter().filter_map(LineEvent::active_line).collect()
}

pub fn output_lines(events: &[LineEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(LineEvent::output_text)
        .map(str::to_string)
        .collect()
}

pub fn output_text(events: &[LineEvent]) -> String {
    output_lines(events).join("\n")
}

/// Exactly one terminal event, and it is the last one
pub fn assert_ends_with(events: &[LineEvent], terminal: fn(&LineEvent) -> bool) {
    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1, "events: {:?}", events);
    assert!(
        events.last().is_some_and(terminal),
        "unexpected last event in {:?}",
        events
    );
}

pub fn is_end(event: &LineEvent) -> bool {
    *event == LineEvent::EndOfExecution
}

pub fn is_fault(event: &LineEvent) -> bool {
    matches!(event, LineEvent::Fault(_))
}

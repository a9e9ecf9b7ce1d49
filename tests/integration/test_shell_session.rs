//! Integration Tests for the POSIX Shell Session
//!
//! These run real commands in a persistent bash (or sh) subprocess and are
//! skipped when neither is installed.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use linecast::languages::adapter_for;
use linecast::process::InterpreterSession;
use linecast::{Error, Language, LineEvent};
use std::sync::Arc;
use test_utils::*;
use tokio::sync::Mutex;

async fn start_session() -> Option<Arc<Mutex<InterpreterSession>>> {
    let config = config_for(Language::Shell)?;
    let adapter = adapter_for(Language::Shell, &config).ok()?;
    let session = InterpreterSession::start(adapter, &config.session).expect("shell should start");
    Some(Arc::new(Mutex::new(session)))
}

async fn run(session: &Arc<Mutex<InterpreterSession>>, code: &str) -> Vec<LineEvent> {
    let guard = session.clone().lock_owned().await;
    let turn = linecast::ExecutionTurn::begin(guard, code).expect("submission should be accepted");
    collect_events(turn).await
}

#[tokio::test]
async fn test_echo_lines_in_order() {
    let Some(session) = start_session().await else {
        return;
    };

    let events = run(&session, "echo one\necho two").await;

    assert_eq!(
        events,
        vec![
            LineEvent::ActiveLine(1),
            LineEvent::OutputText("one".to_string()),
            LineEvent::ActiveLine(2),
            LineEvent::OutputText("two".to_string()),
            LineEvent::EndOfExecution,
        ]
    );
}

#[tokio::test]
async fn test_syntax_error_keeps_the_shell_alive() {
    let Some(session) = start_session().await else {
        return;
    };
    let pid = session.lock().await.pid();

    let guard = session.clone().lock_owned().await;
    match linecast::ExecutionTurn::begin(guard, "echo a\nif then") {
        Err(Error::InstrumentationFailed { line, .. }) => assert_eq!(line, 2),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("unparsable code was submitted"),
    }

    let events = run(&session, "echo still here").await;
    assert_eq!(output_lines(&events), vec!["still here"]);
    assert_ends_with(&events, is_end);

    let mut guard = session.lock().await;
    assert!(guard.is_alive());
    assert_eq!(guard.pid(), pid);
}

#[tokio::test]
async fn test_state_persists_between_turns() {
    let Some(session) = start_session().await else {
        return;
    };

    run(&session, "GREETING=hello").await;
    let events = run(&session, "echo \"$GREETING world\"").await;

    assert_eq!(output_lines(&events), vec!["hello world"]);
}

#[tokio::test]
async fn test_control_flow_markers() {
    let Some(session) = start_session().await else {
        return;
    };

    let code = "for i in 1 2; do\n  echo \"item $i\"\ndone\nif true; then\n  echo yes\nfi";
    let events = run(&session, code).await;

    assert_eq!(active_lines(&events), vec![1, 2, 2, 4, 5]);
    assert_eq!(output_lines(&events), vec!["item 1", "item 2", "yes"]);
    assert_ends_with(&events, is_end);
}

#[tokio::test]
async fn test_heredoc_body_is_untouched() {
    let Some(session) = start_session().await else {
        return;
    };

    let events = run(&session, "cat <<EOF\nfirst\nsecond\nEOF\necho after").await;

    assert_eq!(active_lines(&events), vec![1, 5]);
    assert_eq!(output_lines(&events), vec!["first", "second", "after"]);
}

#[tokio::test]
async fn test_failing_command_is_output_and_shell_survives() {
    let Some(session) = start_session().await else {
        return;
    };

    let events = run(&session, "ls /nonexistent-linecast-dir\necho after").await;

    assert_ends_with(&events, is_end);
    let output = output_lines(&events);
    assert_eq!(output.len(), 2, "output: {:?}", output);
    assert!(output[0].contains("nonexistent-linecast-dir"));
    assert_eq!(output[1], "after");

    let events = run(&session, "echo again").await;
    assert_eq!(output_lines(&events), vec!["again"]);
}

#[tokio::test]
async fn test_exit_is_a_fault() {
    let Some(session) = start_session().await else {
        return;
    };

    let events = run(&session, "exit 3").await;
    assert_ends_with(&events, is_fault);
    assert_eq!(
        events.last(),
        Some(&LineEvent::Fault("interpreter exited with status 3".to_string()))
    );

    let mut guard = session.lock().await;
    assert!(guard.needs_restart());
    assert!(!guard.is_alive());
    assert!(guard.submit("echo never").is_err());
}

#[tokio::test]
async fn test_kill_reaches_child_commands() {
    let Some(session) = start_session().await else {
        return;
    };

    let guard = session.clone().lock_owned().await;
    let mut turn = linecast::ExecutionTurn::begin(guard, "echo start\nsleep 60").unwrap();

    loop {
        match next_event(&mut turn).await {
            Some(LineEvent::ActiveLine(2)) => break,
            Some(event) => assert!(!event.is_terminal(), "early end: {:?}", event),
            None => panic!("turn ended early"),
        }
    }

    let started = std::time::Instant::now();
    turn.killer().kill().await.unwrap();
    let rest = collect_events(turn).await;

    assert_ends_with(&rest, is_fault);
    assert!(started.elapsed() < std::time::Duration::from_secs(30));
}

#[tokio::test]
async fn test_busy_session_rejects_second_submission() {
    let Some(session) = start_session().await else {
        return;
    };

    let mut guard = session.lock().await;
    guard.submit("sleep 0.2\necho done").unwrap();
    assert!(guard.is_busy());

    let err = guard.submit("echo again").unwrap_err();
    assert!(matches!(err, linecast::Error::ExecutionInProgress { .. }));

    let mut events = Vec::new();
    while let Some(event) = guard.next_event().await {
        events.push(event);
    }
    assert_eq!(output_lines(&events), vec!["done"]);
    assert!(!guard.is_busy());
}

//! Integration Tests for the Python Interpreter Session
//!
//! These run real code in a persistent `python -i` subprocess and are skipped
//! when no Python runtime is installed.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use linecast::{CodeRequest, Error, Language, LineEvent, SessionManager};
use test_utils::*;

fn python_manager() -> Option<SessionManager> {
    config_for(Language::Python).map(SessionManager::new)
}

async fn run(manager: &SessionManager, code: &str) -> Vec<LineEvent> {
    let turn = manager
        .execute(CodeRequest::new(Language::Python, code))
        .await
        .expect("submission should be accepted");
    collect_events(turn).await
}

#[tokio::test]
async fn test_markers_precede_their_output() {
    let Some(manager) = python_manager() else {
        return;
    };

    let events = run(&manager, "print(1)\nprint(2)").await;

    assert_eq!(
        events,
        vec![
            LineEvent::ActiveLine(1),
            LineEvent::OutputText("1".to_string()),
            LineEvent::ActiveLine(2),
            LineEvent::OutputText("2".to_string()),
            LineEvent::EndOfExecution,
        ]
    );
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_prompt_like_output_is_kept_verbatim() {
    let Some(manager) = python_manager() else {
        return;
    };

    let events = run(&manager, "print('>>> x')\nprint('...')\nprint('... loading')").await;

    assert_eq!(active_lines(&events), vec![1, 2, 3]);
    assert_eq!(output_lines(&events), vec![">>> x", "...", "... loading"]);
    assert_ends_with(&events, is_end);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_loop_repeats_body_markers() {
    let Some(manager) = python_manager() else {
        return;
    };

    let events = run(&manager, "total = 0\nfor i in range(3):\n    total += i\nprint(total)").await;

    assert_eq!(active_lines(&events), vec![1, 2, 3, 3, 3, 4]);
    assert_eq!(output_lines(&events), vec!["3"]);
    assert_ends_with(&events, is_end);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_branches_not_taken_have_no_markers() {
    let Some(manager) = python_manager() else {
        return;
    };

    let code = "x = 5\nif x > 10:\n    print('big')\nelif x > 3:\n    print('medium')\nelse:\n    print('small')";
    let events = run(&manager, code).await;

    assert_eq!(active_lines(&events), vec![1, 2, 4, 5]);
    assert_eq!(output_lines(&events), vec!["medium"]);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_function_body_markers_fire_on_call() {
    let Some(manager) = python_manager() else {
        return;
    };

    let code = "def double(a):\n    return a * 2\n\nprint(double(21))";
    let events = run(&manager, code).await;

    assert_eq!(active_lines(&events), vec![1, 4, 2]);
    assert_eq!(output_lines(&events), vec!["42"]);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_error_is_printed_and_session_survives() {
    let Some(manager) = python_manager() else {
        return;
    };

    let code = "x = 1\nraise ValueError('boom')\nprint('unreachable')";
    let events = run(&manager, code).await;

    assert_ends_with(&events, is_end);
    let output = output_text(&events);
    assert!(output.contains("Traceback"), "output: {}", output);
    assert!(output.contains("ValueError: boom"), "output: {}", output);
    assert!(!output.contains("unreachable"));
    assert!(!active_lines(&events).contains(&3));

    // Same process, same globals
    let events = run(&manager, "print(x)").await;
    assert_eq!(output_lines(&events), vec!["1"]);
    assert_ends_with(&events, is_end);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_multiline_string_and_blank_lines() {
    let Some(manager) = python_manager() else {
        return;
    };

    let code = "text = \"\"\"a\n\nb\"\"\"\n\n\nprint(len(text.splitlines()))";
    let events = run(&manager, code).await;

    assert_eq!(active_lines(&events), vec![1, 6]);
    assert_eq!(output_lines(&events), vec!["3"]);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_syntax_error_is_rejected_before_running() {
    let Some(manager) = python_manager() else {
        return;
    };

    let err = manager
        .execute(CodeRequest::new(Language::Python, "def broken(:\n    pass"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InstrumentationFailed { line: 1, .. }));

    let events = run(&manager, "print('still here')").await;
    assert_eq!(output_lines(&events), vec!["still here"]);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_kill_mid_turn_yields_fault() {
    let Some(manager) = python_manager() else {
        return;
    };

    let code = "import time\nwhile True:\n    time.sleep(0.05)";
    let mut turn = manager
        .execute(CodeRequest::new(Language::Python, code))
        .await
        .unwrap();

    // Wait until the loop body is running
    loop {
        match next_event(&mut turn).await {
            Some(LineEvent::ActiveLine(3)) => break,
            Some(event) => assert!(!event.is_terminal(), "early end: {:?}", event),
            None => panic!("turn ended before the loop started"),
        }
    }

    turn.killer().kill().await.unwrap();
    let rest = collect_events(turn).await;
    assert_ends_with(&rest, is_fault);

    // A fresh interpreter takes over
    let events = run(&manager, "print('back')").await;
    assert_eq!(output_lines(&events), vec!["back"]);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_interpreter_exit_is_a_fault() {
    let Some(manager) = python_manager() else {
        return;
    };

    let events = run(&manager, "import sys\nsys.exit(3)").await;
    assert_ends_with(&events, is_fault);
    assert_eq!(
        events.last(),
        Some(&LineEvent::Fault("interpreter exited with status 3".to_string()))
    );

    let events = run(&manager, "print('restarted')").await;
    assert_eq!(output_lines(&events), vec!["restarted"]);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_transcript_keeps_raw_lines() {
    let Some(manager) = python_manager() else {
        return;
    };

    run(&manager, "print('logged')").await;

    let transcript = manager.transcript(Language::Python).await.unwrap();
    assert!(transcript.contains("##active_line1##"));
    assert!(transcript.contains("logged"));
    assert!(transcript.contains("##end_of_execution##"));
    manager.shutdown().await.unwrap();
}

//! Integration Tests for the Session Manager
//!
//! Session creation, reuse, reset and concurrent submissions, exercised with
//! the POSIX shell. Skipped when no shell is installed.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use futures::StreamExt;
use linecast::{CodeRequest, Error, ExecutionChunk, Language, SessionManager};
use test_utils::*;

fn shell_manager() -> Option<SessionManager> {
    config_for(Language::Shell).map(SessionManager::new)
}

fn shell(code: &str) -> CodeRequest {
    CodeRequest::new(Language::Shell, code)
}

#[tokio::test]
async fn test_session_is_created_on_first_use_and_reused() {
    let Some(manager) = shell_manager() else {
        return;
    };
    assert!(manager.active_languages().await.is_empty());

    let turn = manager.execute(shell("echo $$")).await.unwrap();
    let first_pid = turn.killer().pid();
    collect_events(turn).await;
    assert_eq!(manager.active_languages().await, vec![Language::Shell]);

    let turn = manager.execute(shell("echo $$")).await.unwrap();
    assert_eq!(turn.killer().pid(), first_pid);
    collect_events(turn).await;

    manager.shutdown().await.unwrap();
    assert!(manager.active_languages().await.is_empty());
}

#[tokio::test]
async fn test_concurrent_submission_fails_fast() {
    let Some(manager) = shell_manager() else {
        return;
    };

    let turn = manager.execute(shell("sleep 0.3\necho first")).await.unwrap();

    let err = manager.execute(shell("echo second")).await.unwrap_err();
    assert!(matches!(err, Error::ExecutionInProgress { .. }));

    let events = collect_events(turn).await;
    assert_eq!(output_lines(&events), vec!["first"]);

    // Free again once the turn is over
    let events = collect_events(manager.execute(shell("echo third")).await.unwrap()).await;
    assert_eq!(output_lines(&events), vec!["third"]);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reset_starts_a_clean_session() {
    let Some(manager) = shell_manager() else {
        return;
    };

    collect_events(manager.execute(shell("MARK=set")).await.unwrap()).await;
    manager.reset(Language::Shell).await.unwrap();
    assert!(manager.active_languages().await.is_empty());

    let events =
        collect_events(manager.execute(shell("echo \"${MARK:-unset}\"")).await.unwrap()).await;
    assert_eq!(output_lines(&events), vec!["unset"]);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reset_during_turn_ends_it_with_fault() {
    let Some(manager) = shell_manager() else {
        return;
    };

    let mut turn = manager
        .execute(shell("echo started\nwhile true; do :; done"))
        .await
        .unwrap();
    while let Some(event) = next_event(&mut turn).await {
        if event.output_text() == Some("started") {
            break;
        }
    }

    manager.reset(Language::Shell).await.unwrap();

    let rest = collect_events(turn).await;
    assert_ends_with(&rest, is_fault);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_dropped_turn_does_not_block_the_language() {
    let Some(manager) = shell_manager() else {
        return;
    };

    let turn = manager.execute(shell("sleep 30")).await.unwrap();
    drop(turn);

    let events = collect_events(manager.execute(shell("echo fresh")).await.unwrap()).await;
    assert_eq!(output_lines(&events), vec!["fresh"]);
    assert_ends_with(&events, is_end);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_chunk_stream_ends_with_done() {
    let Some(manager) = shell_manager() else {
        return;
    };

    let turn = manager.execute(shell("echo chunk")).await.unwrap();
    let chunks: Vec<ExecutionChunk> = tokio::time::timeout(TURN_TIMEOUT, turn.into_chunks().collect())
        .await
        .unwrap();

    assert_eq!(chunks[0].active_line, Some(1));
    assert_eq!(chunks[1].output.as_deref(), Some("chunk\n"));
    assert!(chunks.last().unwrap().done);
    assert_eq!(chunks.iter().filter(|c| c.done).count(), 1);
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_collect_output() {
    let Some(manager) = shell_manager() else {
        return;
    };

    let turn = manager.execute(shell("echo a\necho b")).await.unwrap();
    let output = tokio::time::timeout(TURN_TIMEOUT, turn.collect_output())
        .await
        .unwrap();

    assert_eq!(output.output, "a\nb\n");
    assert_eq!(output.active_lines, vec![1, 2]);
    assert!(output.fault.is_none());
    manager.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_eager_sessions() {
    let Some(mut config) = config_for(Language::Shell) else {
        return;
    };
    config.session.eager_languages = vec!["shell".to_string()];
    let manager = SessionManager::new(config);

    assert_eq!(manager.start_eager().await, vec![Language::Shell]);
    assert_eq!(manager.active_languages().await, vec![Language::Shell]);
    manager.shutdown().await.unwrap();
}

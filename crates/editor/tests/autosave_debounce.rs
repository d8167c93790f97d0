mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use callie_domain::config::AutosaveConfig;
use callie_editor::reconcile::{AudioChange, IdentityChange, LlmChange};
use callie_editor::EditorSession;
use common::FakeApi;
use tokio::time::sleep;

async fn loaded_session(api: &Arc<FakeApi>) -> EditorSession {
    let session = EditorSession::new(api.clone(), &AutosaveConfig::default());
    session.load_agent("agent-1").await.unwrap();
    session
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_saves_once_with_latest_state() {
    let api = Arc::new(FakeApi::with_agent());
    let session = loaded_session(&api).await;

    for t in [0.3, 0.4, 0.5, 0.6, 0.7] {
        session.apply_llm(LlmChange::Temperature(t));
        sleep(Duration::from_millis(500)).await;
    }
    assert!(api.saved().is_empty(), "saved inside the quiet period");

    sleep(Duration::from_millis(2_000)).await;

    let saved = api.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].llm_id, "llm-1");
    assert_eq!(saved[0].temperature, 0.7);

    let status = session.save_status();
    assert!(!status.is_saving);
    assert!(status.last_saved_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn loading_does_not_save() {
    let api = Arc::new(FakeApi::with_agent());
    let _session = loaded_session(&api).await;

    sleep(Duration::from_secs(10)).await;
    assert!(api.saved().is_empty());
}

#[tokio::test(start_paused = true)]
async fn edits_before_load_do_not_save() {
    let api = Arc::new(FakeApi::with_agent());
    let session = EditorSession::new(api.clone(), &AutosaveConfig::default());

    session.apply_llm(LlmChange::Temperature(0.9));
    sleep(Duration::from_secs(5)).await;
    assert!(api.saved().is_empty());
}

#[tokio::test(start_paused = true)]
async fn edits_outside_the_llm_do_not_save() {
    let api = Arc::new(FakeApi::with_agent());
    let session = loaded_session(&api).await;

    session.apply_identity(IdentityChange::Name("Night shift".into()));
    session.apply_audio(AudioChange::Volume(0.4));
    sleep(Duration::from_secs(5)).await;
    assert!(api.saved().is_empty());
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_save_separately() {
    let api = Arc::new(FakeApi::with_agent());
    let session = loaded_session(&api).await;

    session.apply_llm(LlmChange::MaxTokens(300));
    sleep(Duration::from_secs(3)).await;
    session.apply_llm(LlmChange::MaxTokens(600));
    sleep(Duration::from_secs(3)).await;

    let tokens: Vec<u32> = api.saved().iter().map(|l| l.max_tokens).collect();
    assert_eq!(tokens, vec![300, 600]);
}

#[tokio::test(start_paused = true)]
async fn failed_save_is_reported_and_not_retried() {
    let api = Arc::new(FakeApi::with_agent());
    let session = loaded_session(&api).await;
    api.fail_save_llm.store(true, Ordering::SeqCst);

    session.apply_llm(LlmChange::TopK(10));
    sleep(Duration::from_secs(3)).await;

    let status = session.save_status();
    assert!(status.last_error.is_some());
    assert!(status.last_saved_at.is_none());

    // Nothing retries on its own.
    api.fail_save_llm.store(false, Ordering::SeqCst);
    sleep(Duration::from_secs(10)).await;
    assert!(api.saved().is_empty());

    // The next edit carries everything.
    session.apply_llm(LlmChange::TopK(20));
    sleep(Duration::from_secs(3)).await;
    let saved = api.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].top_k, 20);
    assert!(session.save_status().last_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn flush_saves_without_waiting_for_the_timer() {
    let api = Arc::new(FakeApi::with_agent());
    let session = loaded_session(&api).await;

    session.apply_identity(IdentityChange::Description("Be brief.".into()));
    session.flush_autosave().await;

    let saved = api.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].general_prompt, "Be brief.");

    // The timer does not fire a second save afterwards.
    sleep(Duration::from_secs(5)).await;
    assert_eq!(api.saved().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_drops_pending_save() {
    let api = Arc::new(FakeApi::with_agent());
    let session = loaded_session(&api).await;

    session.apply_llm(LlmChange::Model("gpt-4o-mini".into()));
    session.shutdown();
    sleep(Duration::from_secs(5)).await;
    assert!(api.saved().is_empty());
}

#[tokio::test(start_paused = true)]
async fn disabled_autosave_never_saves() {
    let api = Arc::new(FakeApi::with_agent());
    let config = AutosaveConfig {
        enabled: false,
        ..Default::default()
    };
    let session = EditorSession::new(api.clone(), &config);
    session.load_agent("agent-1").await.unwrap();

    session.apply_llm(LlmChange::Temperature(0.8));
    sleep(Duration::from_secs(5)).await;
    assert!(api.saved().is_empty());
    assert_eq!(session.save_status(), Default::default());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_edits_save_the_committed_state() {
    let api = Arc::new(FakeApi::with_agent());
    let session = loaded_session(&api).await;

    std::thread::scope(|scope| {
        for worker in 0..4u32 {
            let session = &session;
            scope.spawn(move || {
                for step in 0..50u32 {
                    session.apply_llm(LlmChange::MaxTokens(100 + worker * 50 + step));
                }
            });
        }
    });
    session.flush_autosave().await;

    let saved = api.saved();
    let last = saved.last().expect("at least one save");
    assert_eq!(last, &session.record().llm);
}

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use callie_client::{PhoneAssignmentUpdate, PhoneNumberDto, ResponseEngineRef, VoiceAgentDto};
use callie_domain::agent::{AgentRecord, Tool, ToolKind};
use callie_domain::config::AutosaveConfig;
use callie_domain::error::Error;
use callie_editor::reconcile::{CallSettingsChange, FunctionsChange, TransferPatch};
use callie_editor::{EditorSession, NotificationLevel, PublishRequest};
use common::FakeApi;
use serde_json::json;

fn session(api: &Arc<FakeApi>) -> EditorSession {
    EditorSession::new(api.clone(), &AutosaveConfig::default())
}

#[tokio::test]
async fn template_hydration_keeps_untouched_defaults() {
    let api = Arc::new(FakeApi::default());
    api.templates.lock().insert(
        "dental".into(),
        VoiceAgentDto {
            agent_name: Some("Dental reception".into()),
            response_engine: Some(ResponseEngineRef::reacherr_llm("llm-9")),
            ..Default::default()
        },
    );
    api.llms
        .lock()
        .insert("llm-9".into(), json!({ "generalPrompt": "Greet patients." }));

    let session = session(&api);
    let rec = session.create_from_template("dental").await.unwrap();

    let mut expected = AgentRecord::default();
    expected.agent_name = "Dental reception".into();
    expected.llm.llm_id = "llm-9".into();
    expected.llm.general_prompt = "Greet patients.".into();
    assert_eq!(*rec, expected);
    assert!(session.is_loaded());
}

#[tokio::test]
async fn failed_load_keeps_record_and_notifies() {
    let api = Arc::new(FakeApi::default());
    let session = session(&api);

    let err = session.load_agent("missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(*session.record(), AgentRecord::default());
    assert!(!session.is_loaded());

    let notes = session.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert!(session.take_notifications().is_empty());
}

#[tokio::test]
async fn missing_llm_fails_the_whole_load() {
    let api = Arc::new(FakeApi::with_agent());
    api.llms.lock().clear();
    let session = session(&api);

    assert!(session.load_agent("agent-1").await.is_err());
    assert_eq!(*session.record(), AgentRecord::default());
}

#[tokio::test]
async fn panel_edits_flow_into_views() {
    let api = Arc::new(FakeApi::with_agent());
    let session = session(&api);
    session.load_agent("agent-1").await.unwrap();

    session.apply_call_settings(CallSettingsChange::NoResponseTime(12.0));
    session.apply_functions(FunctionsChange::TransferEnabled(true));
    session.apply_functions(FunctionsChange::TransferDetails(TransferPatch {
        phone_number: Some("+15551234567".into()),
        ..Default::default()
    }));

    let rec = session.record();
    assert_eq!(rec.no_response_timeout_ms, 12_000);

    let views = session.views();
    assert_eq!(views.call_settings.no_response_time, 12.0);
    assert!(views.functions.transfer_enabled);
    assert_eq!(views.functions.transfer_details.phone_number, "+15551234567");

    // Same record, same projection.
    assert!(Arc::ptr_eq(&views, &session.views()));
}

#[tokio::test]
async fn no_op_reconcile_keeps_record_identity() {
    let api = Arc::new(FakeApi::with_agent());
    let session = session(&api);
    session.load_agent("agent-1").await.unwrap();

    let before = session.record();
    // Detail edits on a disabled tool produce no mutation.
    let after = session.apply_functions(FunctionsChange::SmsDetails(Default::default()));
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn set_path_rejects_unknown_fields() {
    let api = Arc::new(FakeApi::with_agent());
    let session = session(&api);

    let rec = session
        .set_path("ttsConfig.settings.volume", json!(0.7))
        .unwrap();
    assert_eq!(rec.tts_config.settings.volume, 0.7);

    let err = session.set_path("ttsConfig.nope", json!(1)).unwrap_err();
    assert!(matches!(err, Error::InvalidPath { .. }));
}

fn phone(number: &str, inbound: Option<&str>) -> PhoneNumberDto {
    PhoneNumberDto {
        phone_number: number.into(),
        inbound_agent_id: inbound.map(Into::into),
        ..Default::default()
    }
}

#[tokio::test]
async fn publish_saves_publishes_and_reassigns_numbers() {
    let api = Arc::new(FakeApi::with_agent());
    *api.phones.lock() = vec![
        phone("+1001", Some("agent-1")),
        phone("+1002", None),
        phone("+1003", Some("agent-2")),
    ];
    let session = session(&api);
    session.load_agent("agent-1").await.unwrap();

    let outcome = session
        .publish(PublishRequest {
            version_name: "V1".into(),
            description: "Holiday hours".into(),
            inbound: Some("+1002".into()),
            outbound: None,
        })
        .await
        .unwrap();

    assert_eq!(api.saved().len(), 1, "llm saved before publishing");

    let published = api.published.lock().clone();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "agent-1");
    assert_eq!(published[0].1.version_name.as_deref(), Some("V1"));
    assert_eq!(published[0].1.is_published, Some(true));

    assert_eq!(
        outcome.phone_updates,
        vec![
            PhoneAssignmentUpdate {
                phone_number: "+1001".into(),
                inbound_agent_id: None,
                outbound_agent_id: None,
            },
            PhoneAssignmentUpdate {
                phone_number: "+1002".into(),
                inbound_agent_id: Some("agent-1".into()),
                outbound_agent_id: None,
            },
        ]
    );
    assert_eq!(*api.phone_updates.lock(), outcome.phone_updates);

    let meta = &session.record().version_metadata;
    assert!(meta.is_published);
    assert_eq!(meta.version_name, "V1");
    assert_eq!(meta.version_description, "Holiday hours");
    assert!(meta.inbound_assigned);
    assert!(!meta.outbound_assigned);
    assert!(meta.last_modification_timestamp > 0);

    let notes = session.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Info);
}

#[tokio::test]
async fn failed_publish_leaves_record_untouched() {
    let api = Arc::new(FakeApi::with_agent());
    api.fail_publish.store(true, Ordering::SeqCst);
    let session = session(&api);
    session.load_agent("agent-1").await.unwrap();
    let before = session.record();

    let err = session
        .publish(PublishRequest {
            version_name: "V1".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 422, .. }));

    assert_eq!(*session.record(), *before);
    assert!(api.phone_updates.lock().is_empty());
    let notes = session.take_notifications();
    assert_eq!(notes[0].level, NotificationLevel::Error);
}

#[tokio::test]
async fn publish_requires_a_loaded_agent() {
    let api = Arc::new(FakeApi::default());
    let session = session(&api);

    let err = session.publish(PublishRequest::default()).await.unwrap_err();
    assert!(matches!(err, Error::Other(_)));
    assert!(api.published.lock().is_empty());
}

#[tokio::test]
async fn published_payload_carries_tools_and_engine() {
    let api = Arc::new(FakeApi::with_agent());
    let session = session(&api);
    session.load_agent("agent-1").await.unwrap();
    session.apply_functions(FunctionsChange::BookingEnabled(true));

    session
        .publish(PublishRequest {
            version_name: "V2".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let saved = api.saved();
    let booking = saved
        .last()
        .and_then(|llm| llm.general_tools.iter().find(|t| t.is_kind(ToolKind::BookAppointmentCal)))
        .and_then(|t| t.as_tool().cloned());
    assert!(matches!(booking, Some(Tool::BookAppointmentCal(_))));

    let published = api.published.lock().clone();
    let engine = published[0].1.response_engine.clone().unwrap();
    assert_eq!(engine.llm_id.as_deref(), Some("llm-1"));
}

//! Profile file persistence, resume import and resume structuring.

mod common;

use common::{ready_profile, store_with, ScriptedModel};
use job_autofill::profile::{Details, ProfileStore};
use job_autofill::resume::{derive_structured_resume, import_resume};
use job_autofill::AutofillError;

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with(&dir, &ready_profile()).await;

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, ready_profile());
}

#[tokio::test]
async fn test_file_is_pretty_printed_with_two_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with(&dir, &ready_profile()).await;

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.starts_with("{\n  \"apiKey\": \"test-key\""));
    assert!(text.ends_with("}\n"));
}

#[tokio::test]
async fn test_unknown_fields_survive_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("userData.json");
    std::fs::write(
        &path,
        r#"{"apiKey": "k", "resumeRaw": "text", "details": {}, "favoriteColor": "teal"}"#,
    )
    .unwrap();
    let store = ProfileStore::new(&path);

    let profile = store.load().await.unwrap();
    store.save(&profile).await.unwrap();

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["favoriteColor"], "teal");
}

#[tokio::test]
async fn test_missing_file_is_configuration_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(dir.path().join("nope.json"));

    let err = store.load().await.unwrap_err();
    assert!(matches!(err, AutofillError::ConfigurationMissing(ref m) if m.contains("not found")));
}

#[tokio::test]
async fn test_corrupt_file_is_configuration_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("userData.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let err = ProfileStore::new(&path).load().await.unwrap_err();
    assert!(matches!(err, AutofillError::ConfigurationMissing(_)));
}

#[tokio::test]
async fn test_import_resume_from_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("resume.txt");
    std::fs::write(&resume, "Ada Lovelace\nAnalytical Engine programmer").unwrap();
    let store = ProfileStore::new(dir.path().join("userData.json"));
    let details = Details::from([("gender".to_string(), "Female".to_string())]);

    let profile = import_resume(&store, " key-123 ", &resume, details).await.unwrap();

    assert_eq!(profile.api_key, "key-123");
    assert!(profile.resume_raw.contains("Analytical Engine"));
    assert_eq!(profile.resume_path.as_deref(), Some(resume.as_path()));
    assert!(profile.resume_structured.is_none());
    assert_eq!(store.load().await.unwrap(), profile);
}

#[tokio::test]
async fn test_import_missing_resume_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(dir.path().join("userData.json"));

    let err = import_resume(&store, "k", &dir.path().join("missing.pdf"), Details::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AutofillError::InvalidInput(_)));
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_derive_structured_resume_merges_contact_details() {
    let dir = tempfile::tempdir().unwrap();
    let mut profile = ready_profile();
    profile.resume_structured = None;
    profile.details = Some(Details::from([("address".to_string(), "1 Main St".to_string())]));
    let store = store_with(&dir, &profile).await;

    let model = ScriptedModel::replying(
        "```json\n{\"name\": \"Ada Lovelace\", \"email\": \"ada@example.com\", \"phone\": \"555-0100\", \
         \"skills\": [\"Go\", \"SQL\"], \"experience\": [], \"education\": [], \"projects\": []}\n```",
    );

    let structured = derive_structured_resume(&model, &store).await.unwrap();
    assert_eq!(structured.skills.len(), 2);

    let saved = store.load().await.unwrap();
    let details = saved.details.unwrap();
    assert_eq!(details["address"], "1 Main St");
    assert_eq!(details["email"], "ada@example.com");
    assert_eq!(details["phone"], "555-0100");
    assert_eq!(saved.resume_structured.unwrap().name.as_deref(), Some("Ada Lovelace"));
    assert!(model.last_prompt().unwrap().contains("Go, SQL"));
}

#[tokio::test]
async fn test_unparsable_resume_reply_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut profile = ready_profile();
    profile.resume_structured = None;
    let store = store_with(&dir, &profile).await;
    let before = std::fs::read_to_string(store.path()).unwrap();

    let model = ScriptedModel::replying("Here is a summary of the resume: great candidate.");
    let err = derive_structured_resume(&model, &store).await.unwrap_err();

    assert!(matches!(err, AutofillError::AiResponseInvalid { .. }));
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
}

#[tokio::test]
async fn test_derive_without_resume_text_is_configuration_missing() {
    let dir = tempfile::tempdir().unwrap();
    let mut profile = ready_profile();
    profile.resume_raw = "   ".into();
    let store = store_with(&dir, &profile).await;
    let model = ScriptedModel::replying("{}");

    let err = derive_structured_resume(&model, &store).await.unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_numeric_detail_values_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("userData.json");
    std::fs::write(
        &path,
        r#"{"apiKey": "k", "resumeRaw": "text", "resumeStructured": {"name": "Ada"}, "details": {"phone": 5550100}}"#,
    )
    .unwrap();

    let profile = ProfileStore::new(&path).load().await.unwrap();

    let (_, details) = profile.ensure_ready().unwrap();
    assert_eq!(details["phone"], "5550100");
}

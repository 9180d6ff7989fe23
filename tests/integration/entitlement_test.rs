//! Integration tests for document access entitlements.

use chrono::Duration;

use docsync_core::error::ErrorKind;
use docsync_entity::grant::NewAccessGrant;
use docsync_entity::participant::{NewCohort, NewParticipant};

use crate::helpers::{TestApp, start_time};

async fn register(app: &TestApp, whatsapp: &str, cohort: &str) -> i64 {
    app.participants
        .register(NewParticipant {
            name: "Bayu".into(),
            whatsapp: whatsapp.into(),
            workshop_name: Some("Bayu Motor".into()),
            cohort: Some(cohort.into()),
            ..NewParticipant::default()
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_cohort_grant_opens_and_closes_the_catalog() {
    let app = TestApp::new().await;
    app.seed_remote().await;
    app.sync.sync(&app.config.catalog.root_ids()).await;

    let cohort = app
        .participants
        .create_cohort(NewCohort {
            name: "April 2026".into(),
            contact_link: "https://chat.whatsapp.com/april".into(),
            default_access: true,
        })
        .await
        .unwrap();
    let member = register(&app, "081311112222", "April 2026").await;
    let err = app.catalog.catalog_for(member).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    let expires = start_time() + Duration::days(7);
    let grant = app
        .entitlements
        .issue_grant(NewAccessGrant::for_cohort(cohort.id).expiring_at(expires))
        .await
        .unwrap();
    assert_eq!(app.catalog.catalog_for(member).await.unwrap().len(), 2);
    assert!(
        app.catalog
            .file_info_for(member, "f-vario")
            .await
            .unwrap()
            .is_some()
    );

    // The expiry instant itself is still covered.
    app.clock.set(expires);
    assert!(app.entitlements.has_document_access(member).await.unwrap());

    app.clock.set(expires + Duration::seconds(1));
    assert!(!app.entitlements.has_document_access(member).await.unwrap());
    assert_eq!(app.entitlements.revoke_expired().await.unwrap(), 1);
    assert_eq!(app.entitlements.revoke_expired().await.unwrap(), 0);

    let grants = app.entitlements.grants_for_cohort(cohort.id).await.unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].id, grant.id);
    assert!(!grants[0].is_active);
    assert_eq!(
        app.catalog.catalog_for(member).await.unwrap_err().kind,
        ErrorKind::Authorization
    );
}

#[tokio::test]
async fn test_own_flag_outlives_grants() {
    let app = TestApp::new().await;
    app.participants
        .create_cohort(NewCohort {
            name: "May 2026".into(),
            contact_link: String::new(),
            default_access: false,
        })
        .await
        .unwrap();
    let id = register(&app, "081322223333", "May 2026").await;

    let grant = app
        .entitlements
        .issue_grant(NewAccessGrant::for_participant(id).expiring_at(start_time() + Duration::hours(1)))
        .await
        .unwrap();
    assert!(app.entitlements.has_document_access(id).await.unwrap());

    app.entitlements.revoke_grant(grant.id).await.unwrap();
    assert!(!app.entitlements.has_document_access(id).await.unwrap());

    app.participants.set_document_access(id, true).await.unwrap();
    app.clock.advance(Duration::days(30));
    assert!(app.entitlements.has_document_access(id).await.unwrap());
    assert_eq!(app.entitlements.revoke_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_grant_requests_are_validated() {
    let app = TestApp::new().await;

    let err = app
        .entitlements
        .issue_grant(NewAccessGrant::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidGrant);

    let err = app
        .entitlements
        .issue_grant(NewAccessGrant::for_participant(404))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app.entitlements.has_document_access(404).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

//! Integration tests for the periodic task scheduler.

use std::sync::Arc;

use chrono::Duration;

use docsync_entity::grant::NewAccessGrant;
use docsync_entity::participant::NewParticipant;
use docsync_worker::jobs::{CatalogSyncJob, GrantRevocationJob};
use docsync_worker::{SyncScheduler, TickOutcome};

use crate::helpers::{TestApp, start_time};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduled_tasks_run_on_demand() {
    let app = TestApp::new().await;
    app.seed_remote().await;

    let mut scheduler = SyncScheduler::new().await.unwrap();
    scheduler
        .register(
            Arc::new(CatalogSyncJob::new(
                app.sync.clone(),
                app.config.catalog.root_ids(),
            )),
            &app.config.schedule.sync_cron,
        )
        .await
        .unwrap();
    scheduler
        .register(
            Arc::new(GrantRevocationJob::new(app.entitlements.clone())),
            &app.config.schedule.revocation_cron,
        )
        .await
        .unwrap();
    assert_eq!(scheduler.registered().len(), 2);

    let Some(TickOutcome::Completed(summary)) = scheduler.run_now("catalog_sync").await else {
        panic!("catalog sync did not complete");
    };
    assert_eq!(summary["roots"], 2);
    assert_eq!(app.catalog.roots_summary().await.unwrap().len(), 2);

    let participant = app
        .participants
        .register(NewParticipant {
            name: "Sari".into(),
            whatsapp: "081344445555".into(),
            ..NewParticipant::default()
        })
        .await
        .unwrap();
    app.entitlements
        .issue_grant(
            NewAccessGrant::for_participant(participant.id)
                .expiring_at(start_time() + Duration::minutes(30)),
        )
        .await
        .unwrap();
    app.clock.advance(Duration::hours(1));

    let Some(TickOutcome::Completed(summary)) = scheduler.run_now("grant_revocation").await else {
        panic!("grant revocation did not complete");
    };
    assert_eq!(summary["revoked"], 1);
}

//! Integration tests for catalog synchronization and browsing.

use chrono::Duration;

use docsync_entity::sync_log::SyncStatus;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_sync_then_browse_every_root() {
    let app = TestApp::new().await;
    app.seed_remote().await;

    let logs = app.sync.sync(&app.config.catalog.root_ids()).await;
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.status == SyncStatus::Success));
    assert_eq!(logs[1].folders_created, 3);
    assert_eq!(logs[1].files_created, 3);

    let catalog = app.catalog.catalog().await.unwrap();
    let names: Vec<_> = catalog.iter().map(|c| c.display_name.as_str()).collect();
    assert_eq!(names, vec!["Ebooks", "Service Manuals"]);

    let manuals = &catalog[1].tree;
    assert_eq!(manuals.files[0].name, "index.txt");
    let vario = &manuals.subfolders[0].subfolders[0];
    assert_eq!(vario.path, "/Service Manuals/Honda/Vario");
    assert_eq!(vario.files[0].remote_id, "f-vario");

    let summary = app.catalog.roots_summary().await.unwrap();
    assert_eq!(summary.len(), app.roots().len());
    assert_eq!(summary[0].file_count, 1);
    assert_eq!(summary[1].file_count, 1);

    let info = app.catalog.file_info("f-beat").await.unwrap().unwrap();
    assert_eq!(info.folder_remote_id.as_deref(), Some("d-honda"));

    let hits = app.catalog.search("vario").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].folder_path, "/Service Manuals/Honda/Vario");
}

#[tokio::test]
async fn test_resync_follows_remote_changes_without_duplicates() {
    let app = TestApp::new().await;
    app.seed_remote().await;
    let roots = app.config.catalog.root_ids();
    app.sync.sync(&roots).await;

    app.drive.rename("f-wiring", "Wiring Diagram.pdf").await;
    app.drive.move_to("d-vario", "root-manuals").await;
    app.drive.remove("f-index").await;
    app.clock.advance(Duration::hours(6));

    let logs = app.sync.sync(&roots).await;
    assert!(logs.iter().all(|l| l.folders_created == 0 && l.files_created == 0));
    assert_eq!(logs[0].synced_at, app.clock_now());

    let hits = app.catalog.search("wiring").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Wiring Diagram.pdf");

    let contents = app.catalog.folder_contents("root-manuals").await.unwrap().unwrap();
    let names: Vec<_> = contents.items.iter().map(|i| i.name.as_str()).collect();
    // Entries removed remotely stay in the catalog.
    assert_eq!(names, vec!["Honda", "Vario", "index.txt"]);

    let moved = app.catalog.folder_contents("d-vario").await.unwrap().unwrap();
    assert_eq!(moved.items.len(), 1);
    let tree = app.catalog.catalog().await.unwrap();
    assert_eq!(tree[1].tree.subfolders[1].path, "/Service Manuals/Vario");
}

#[tokio::test]
async fn test_failing_root_does_not_block_others() {
    let app = TestApp::new().await;
    app.seed_remote().await;
    app.drive.fail_on("d-electrical").await;

    let logs = app.sync.sync(&app.config.catalog.root_ids()).await;
    assert_eq!(logs[0].status, SyncStatus::Failed);
    assert!(logs[0].error_message.is_some());
    assert_eq!(logs[1].status, SyncStatus::Success);

    // Rows committed before the failure remain browsable.
    assert!(app.catalog.file_info("f-basics").await.unwrap().is_some());
    assert!(app.catalog.file_info("f-wiring").await.unwrap().is_none());

    app.drive.clear_failures().await;
    let logs = app.sync.sync(&app.config.catalog.root_ids()).await;
    assert!(logs.iter().all(|l| l.status == SyncStatus::Success));
    assert!(app.catalog.file_info("f-wiring").await.unwrap().is_some());

    let history = app.catalog.recent_sync_logs(10).await.unwrap();
    assert_eq!(history.len(), 4);
}

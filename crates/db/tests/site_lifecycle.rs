//! Status-guarded transitions across the visit lifecycle.

mod common;

use chrono::Utc;
use sqlx::PgPool;

use fieldops_core::site_status::SiteStatus;
use fieldops_db::models::site::{CheckInEntry, ChecklistMediaEntry, MediaRef, Remark};
use fieldops_db::repositories::SiteRepo;

fn media(urls: &[&str]) -> Vec<MediaRef> {
    urls.iter().map(|u| MediaRef { url: u.to_string() }).collect()
}

fn check_in_entry() -> CheckInEntry {
    CheckInEntry {
        checked_in_at: Utc::now(),
        source_address: "10.0.0.7".into(),
        longitude: 72.8777,
        latitude: 19.0760,
    }
}

/// Drive a freshly created site to `PENDING` (location + site photos).
async fn advance_to_pending(pool: &PgPool, id: i64) {
    assert!(SiteRepo::set_location(pool, id, 72.8777, 19.0760).await.unwrap());
    assert!(
        SiteRepo::add_site_photos(pool, id, &media(&["s3://photos/front.jpg"]), SiteStatus::Pending)
            .await
            .unwrap()
    );
}

/// Drive a site from `PENDING` to `ONGOING` via a checklist submission.
async fn advance_to_ongoing(pool: &PgPool, id: i64, checklist_item_id: i64) {
    let entries = vec![ChecklistMediaEntry {
        checklist_item_id,
        url: "s3://checklist/barriers.jpg".into(),
    }];
    assert!(SiteRepo::append_checklist_media(pool, id, &entries).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_location_only_settable_before_first_visit(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    let site = common::create_site(&pool, &fx, "Culvert repair").await;

    assert!(SiteRepo::set_location(&pool, site.id, 72.8, 19.0).await.unwrap());
    advance_to_pending(&pool, site.id).await;

    // The site left NOT_VISITED; the location is frozen.
    assert!(!SiteRepo::set_location(&pool, site.id, 73.0, 20.0).await.unwrap());
    let site = SiteRepo::find_by_id(&pool, site.id).await.unwrap().unwrap();
    assert_eq!(site.longitude, Some(72.8777));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_site_photos_advance_to_pending_or_completed(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;

    let a = common::create_site(&pool, &fx, "Site A").await;
    assert!(
        SiteRepo::add_site_photos(&pool, a.id, &media(&["s3://a.jpg"]), SiteStatus::Pending)
            .await
            .unwrap()
    );
    let a = SiteRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(a.status, "PENDING");
    assert_eq!(a.site_photos.0, media(&["s3://a.jpg"]));

    // Direct completion at photo time.
    let b = common::create_site(&pool, &fx, "Site B").await;
    assert!(
        SiteRepo::add_site_photos(&pool, b.id, &media(&["s3://b.jpg"]), SiteStatus::Completed)
            .await
            .unwrap()
    );
    let b = SiteRepo::find_by_id(&pool, b.id).await.unwrap().unwrap();
    assert_eq!(b.status, "COMPLETED");

    // A second submission misses the NOT_VISITED guard.
    assert!(
        !SiteRepo::add_site_photos(&pool, a.id, &media(&["s3://a2.jpg"]), SiteStatus::Pending)
            .await
            .unwrap()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_check_in_requires_pending(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    let site = common::create_site(&pool, &fx, "Pump house").await;

    // NOT_VISITED: guard misses.
    assert!(SiteRepo::add_check_in(&pool, site.id, &check_in_entry())
        .await
        .unwrap()
        .is_none());

    advance_to_pending(&pool, site.id).await;
    let updated = SiteRepo::add_check_in(&pool, site.id, &check_in_entry())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.user_check_ins.0.len(), 1);
    assert_eq!(updated.user_check_ins.0[0].source_address, "10.0.0.7");

    // Repeated check-ins append.
    let updated = SiteRepo::add_check_in(&pool, site.id, &check_in_entry())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.user_check_ins.0.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_checklist_submission_merges_and_advances(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    let site = common::create_site(&pool, &fx, "Retaining wall").await;
    advance_to_pending(&pool, site.id).await;

    let item_a = fx.checklist_item_ids[0];
    let entries = vec![
        ChecklistMediaEntry {
            checklist_item_id: item_a,
            url: "s3://one.jpg".into(),
        },
        ChecklistMediaEntry {
            checklist_item_id: item_a,
            url: "s3://two.jpg".into(),
        },
        // Unknown item: dropped without error.
        ChecklistMediaEntry {
            checklist_item_id: 999_999,
            url: "s3://stray.jpg".into(),
        },
    ];
    assert!(SiteRepo::append_checklist_media(&pool, site.id, &entries).await.unwrap());

    let site = SiteRepo::find_by_id(&pool, site.id).await.unwrap().unwrap();
    assert_eq!(site.status, "ONGOING");
    let entry_a = site
        .checklist_progress
        .0
        .iter()
        .find(|e| e.checklist_item_id == item_a)
        .unwrap();
    assert_eq!(entry_a.media_urls, media(&["s3://one.jpg", "s3://two.jpg"]));
    let entry_b = site
        .checklist_progress
        .0
        .iter()
        .find(|e| e.checklist_item_id == fx.checklist_item_ids[1])
        .unwrap();
    assert!(entry_b.media_urls.is_empty());

    // Now ONGOING: a second submission misses the PENDING guard.
    assert!(!SiteRepo::append_checklist_media(&pool, site.id, &entries).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_site_step_media_requires_ongoing_and_assigned_worker(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    let site = common::create_site(&pool, &fx, "Drainage line").await;
    let step = fx.site_step_ids[0];
    let m = media(&["s3://steps/trench.jpg"]);

    // Not ONGOING yet.
    assert!(
        !SiteRepo::append_site_step_media(&pool, site.id, common::WORKER_ID, step, &m)
            .await
            .unwrap()
    );

    advance_to_pending(&pool, site.id).await;
    advance_to_ongoing(&pool, site.id, fx.checklist_item_ids[0]).await;

    // Wrong worker.
    assert!(
        !SiteRepo::append_site_step_media(&pool, site.id, 777, step, &m)
            .await
            .unwrap()
    );

    assert!(
        SiteRepo::append_site_step_media(&pool, site.id, common::WORKER_ID, step, &m)
            .await
            .unwrap()
    );
    let site = SiteRepo::find_by_id(&pool, site.id).await.unwrap().unwrap();
    let entry = site
        .site_step_progress
        .0
        .iter()
        .find(|e| e.site_step_id == step)
        .unwrap();
    assert_eq!(entry.media_urls, m);
    // Step media does not move the status.
    assert_eq!(site.status, "ONGOING");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_measurement_book_completes_an_ongoing_site(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    let site = common::create_site(&pool, &fx, "Box culvert").await;
    let m = media(&["s3://mb/page1.jpg"]);

    assert!(!SiteRepo::add_measurement_book_media(&pool, site.id, &m).await.unwrap());

    advance_to_pending(&pool, site.id).await;
    advance_to_ongoing(&pool, site.id, fx.checklist_item_ids[0]).await;

    assert!(SiteRepo::add_measurement_book_media(&pool, site.id, &m).await.unwrap());
    let site = SiteRepo::find_by_id(&pool, site.id).await.unwrap().unwrap();
    assert_eq!(site.status, "COMPLETED");
    assert_eq!(site.measurement_book_media.0, m);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_remarks_append_regardless_of_status(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    let site = common::create_site(&pool, &fx, "Weir gate").await;

    let remark = Remark {
        comment: "Access road flooded".into(),
        status: "PENDING".into(),
        media_urls: media(&["s3://remarks/road.jpg"]),
    };
    assert!(SiteRepo::add_remark(&pool, site.id, &remark).await.unwrap());
    assert!(SiteRepo::add_remark(&pool, site.id, &remark).await.unwrap());

    let site = SiteRepo::find_by_id(&pool, site.id).await.unwrap().unwrap();
    assert_eq!(site.remarks.0.len(), 2);
    assert_eq!(site.remarks.0[0].comment, "Access road flooded");

    // Unknown site: no row touched.
    assert!(!SiteRepo::add_remark(&pool, 999_999, &remark).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_billing_status_guarded_on_read_status(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    let site = common::create_site(&pool, &fx, "Sluice").await;
    assert!(
        SiteRepo::add_site_photos(&pool, site.id, &media(&["s3://s.jpg"]), SiteStatus::Completed)
            .await
            .unwrap()
    );

    let updated = SiteRepo::set_billing_status(
        &pool,
        site.id,
        "BILL_SUBMITTED",
        SiteStatus::Completed,
        SiteStatus::Completed,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.billing_status.as_deref(), Some("BILL_SUBMITTED"));
    assert_eq!(updated.status, "COMPLETED");

    // Final credit closes the site out.
    let updated = SiteRepo::set_billing_status(
        &pool,
        site.id,
        "AMOUNT_CREDITED",
        SiteStatus::Completed,
        SiteStatus::Submitted,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.status, "SUBMITTED");

    // Guard on a stale read misses.
    assert!(SiteRepo::set_billing_status(
        &pool,
        site.id,
        "BILL_CREDITED",
        SiteStatus::Completed,
        SiteStatus::Completed,
    )
    .await
    .unwrap()
    .is_none());
}

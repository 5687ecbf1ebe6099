//! Filtered, paginated site listings.

mod common;

use sqlx::PgPool;

use fieldops_core::site_status::SiteStatus;
use fieldops_db::models::site::{MediaRef, SiteFilter};
use fieldops_db::repositories::SiteRepo;

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters_by_status_and_search(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    let a = common::create_site(&pool, &fx, "Canal lining phase 1").await;
    common::create_site(&pool, &fx, "Bridge deck").await;

    // Move one site to PENDING.
    let photos = vec![MediaRef {
        url: "s3://p.jpg".into(),
    }];
    assert!(SiteRepo::add_site_photos(&pool, a.id, &photos, SiteStatus::Pending)
        .await
        .unwrap());

    let filter = SiteFilter {
        status: Some("PENDING".into()),
        ..Default::default()
    };
    let page = SiteRepo::list(&pool, &filter, 20, 0).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.results[0].id, a.id);

    let filter = SiteFilter {
        search: Some("canal".into()),
        ..Default::default()
    };
    let page = SiteRepo::list(&pool, &filter, 20, 0).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.results[0].name, "Canal lining phase 1");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_scopes_to_actor(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    common::create_site(&pool, &fx, "Site one").await;
    common::create_site(&pool, &fx, "Site two").await;

    // The fixture worker participates in both sites.
    let filter = SiteFilter {
        actor_id: Some(common::WORKER_ID),
        ..Default::default()
    };
    let page = SiteRepo::list(&pool, &filter, 20, 0).await.unwrap();
    assert_eq!(page.total, 2);

    // The supervisor matches through the other participant column.
    let filter = SiteFilter {
        actor_id: Some(common::SUPERVISOR_ID),
        ..Default::default()
    };
    let page = SiteRepo::list(&pool, &filter, 20, 0).await.unwrap();
    assert_eq!(page.total, 2);

    // A stranger sees nothing.
    let filter = SiteFilter {
        actor_id: Some(999),
        ..Default::default()
    };
    let page = SiteRepo::list(&pool, &filter, 20, 0).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(page.results.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters_by_work_type_membership(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    common::create_site(&pool, &fx, "Typed site").await;

    let filter = SiteFilter {
        work_type_id: Some(fx.work_type_id),
        ..Default::default()
    };
    let page = SiteRepo::list(&pool, &filter, 20, 0).await.unwrap();
    assert_eq!(page.total, 1);

    let filter = SiteFilter {
        work_type_id: Some(fx.work_type_id + 1000),
        ..Default::default()
    };
    let page = SiteRepo::list(&pool, &filter, 20, 0).await.unwrap();
    assert_eq!(page.total, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_paginates_with_total(pool: PgPool) {
    let fx = common::seed_catalog(&pool).await;
    for i in 0..5 {
        common::create_site(&pool, &fx, &format!("Site {i}")).await;
    }

    let filter = SiteFilter::default();
    let page = SiteRepo::list(&pool, &filter, 2, 0).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.results.len(), 2);

    let last = SiteRepo::list(&pool, &filter, 2, 4).await.unwrap();
    assert_eq!(last.total, 5);
    assert_eq!(last.results.len(), 1);
}

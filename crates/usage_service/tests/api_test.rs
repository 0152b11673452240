//! HTTP round-trip tests for the usage service.

use actix_web::{test, web, App};
use serde_json::{json, Value};
use usage_service::server::app_config;
use usage_service::store::UsageStore;

fn store() -> web::Data<UsageStore> {
    web::Data::new(UsageStore::open_in_memory().unwrap())
}

#[actix_web::test]
async fn tracked_enhancement_shows_up_in_stats() {
    let store = store();
    let app = test::init_service(App::new().app_data(store.clone()).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/api/track/enhancement")
        .set_json(json!({
            "userId": "user-1",
            "filename": "photo.jpg",
            "fileSize": 2048000,
            "processingTime": 1.23,
            "enhancementType": "auto",
            "success": true,
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert!(body["id"].as_i64().unwrap() > 0);

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["users"], 1);
    assert_eq!(stats["photosEnhanced"], 1);
    assert_eq!(stats["photosWatermarked"], 0);
}

#[actix_web::test]
async fn watermark_tracking_counts_photos() {
    let store = store();
    let app = test::init_service(App::new().app_data(store.clone()).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/api/track/watermark")
        .set_json(json!({
            "userId": "user-1",
            "processingTime": 3.6,
            "watermarkText": "© PixelFly",
            "watermarkStyle": "modern_glass",
            "watermarkPosition": "smart_adaptive",
            "photoCount": 3,
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["photosWatermarked"], 3);
}

#[actix_web::test]
async fn anonymous_usage_counts_photos_but_not_users() {
    let store = store();
    let app = test::init_service(App::new().app_data(store.clone()).configure(app_config)).await;

    let req = test::TestRequest::post()
        .uri("/api/track/enhancement")
        .set_json(json!({
            "userId": "anonymous",
            "enhancementType": "auto",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["users"], 0);
    assert_eq!(stats["photosEnhanced"], 1);
}

#[actix_web::test]
async fn stats_are_marked_uncacheable() {
    let store = store();
    let app = test::init_service(App::new().app_data(store.clone()).configure(app_config)).await;

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "no-store"
    );
}

#[actix_web::test]
async fn stats_survive_a_database_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        web::Data::new(UsageStore::open(dir.path().join("usage.db")).unwrap());
    let app = test::init_service(App::new().app_data(store.clone()).configure(app_config)).await;

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["users"], 0);
}

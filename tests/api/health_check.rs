use poem::{get, test::TestClient, Route};

use catalog::routes::health::health_check;

#[tokio::test]
async fn test_health_check() {
    let app = Route::new().at("/health_check", get(health_check));
    let cli = TestClient::new(app);

    let resp = cli.get("/health_check").send().await;
    resp.assert_status_is_ok();
}

crate::app_test!(health_check_is_mounted_on_the_app, [app] {
    app.get("/health_check").await.assert_status_is_ok();
});

crate::app_test!(openapi_document_is_served, [app] {
    let resp = app.get("/openapi.json").await;
    resp.assert_status_is_ok();
    let doc = crate::api::helpers::body_json(resp).await?;
    assert!(doc["paths"].get("/v1/desenvolvedoras").is_some());
    assert!(doc["paths"].get("/v1/jogos/search").is_some());
});

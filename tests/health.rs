use basket_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");

    let content = response.0.content.expect("health content");
    assert_eq!(content.status, "ok");
}

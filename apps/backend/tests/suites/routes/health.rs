use actix_web::{test, web, App};
use holdem_backend::config::engine::EngineConfig;
use holdem_backend::error::AppError;
use holdem_backend::routes;
use serde_json::Value;

use crate::support::tables::test_state;

#[actix_web::test]
async fn health_reports_database_and_scheduler() -> Result<(), AppError> {
    let (state, _sink) = test_state(EngineConfig::immediate()).await?;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ok");
    assert!(body.get("db_error").is_none());
    assert_eq!(body["pending_wakes"], 0);
    assert!(body["app_version"].is_string());
    Ok(())
}

use actix_web::{test, web, App};
use holdem_backend::config::engine::EngineConfig;
use holdem_backend::error::AppError;
use holdem_backend::routes;
use serde_json::{json, Value};

use crate::common::assert_problem_details;
use crate::support::tables::test_state;

fn table_body() -> Value {
    json!({
        "name": "route table",
        "seat_capacity": 2,
        "small_blind": 10,
        "big_blind": 20,
        "rng_seed": 7,
    })
}

#[actix_web::test]
async fn table_lifecycle_over_http() -> Result<(), AppError> {
    let (state, _sink) = test_state(EngineConfig::immediate()).await?;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/tables")
        .set_json(table_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["table"]["name"], "route table");
    assert_eq!(created["table"]["status"], "waiting");
    let id = created["table"]["id"].as_i64().expect("table id");

    for (player_id, seat_index) in [(1, 0), (2, 1)] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/tables/{id}/seats"))
            .set_json(json!({ "player_id": player_id, "seat_index": seat_index, "buy_in": 1000 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);
        let seat: Value = test::read_body_json(resp).await;
        assert_eq!(seat["seat_index"], seat_index);
    }

    // Two seats: a hand is live and the button (seat 0) opens.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tables/{id}/sync?player_id=1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let snap: Value = test::read_body_json(resp).await;
    assert_eq!(snap["kind"], "snapshot");
    assert_eq!(snap["current_hand"]["phase"], "preflop");
    assert_eq!(snap["current_hand"]["current_actor"], 0);
    assert_eq!(snap["viewer"]["seat_index"], 0);
    assert!(snap["seats"][0]["hole_cards"].is_array());
    assert!(snap["seats"][1]["hole_cards"].is_null());
    let version = snap["version"].as_i64().expect("version");

    let req = test::TestRequest::post()
        .uri(&format!("/api/tables/{id}/actions"))
        .set_json(json!({ "player_id": 2, "action": "check" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 409, "NOT_YOUR_TURN").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/tables/{id}/actions"))
        .set_json(json!({ "player_id": 1, "action": "call", "expected_version": version }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let out: Value = test::read_body_json(resp).await;
    assert_eq!(out["kind"], "call");
    assert_eq!(out["amount"], 20);
    assert_eq!(out["next_actor"], 1);
    assert_eq!(out["phase_changed"], false);

    // The version the client acted on is now stale.
    let req = test::TestRequest::post()
        .uri(&format!("/api/tables/{id}/actions"))
        .set_json(json!({ "player_id": 2, "action": "check", "expected_version": version }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 409, "OPTIMISTIC_LOCK").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/tables/{id}/players/2/sit_out"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 409, "HAND_IN_PROGRESS").await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/tables/{id}/sync?version={version}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let delta: Value = test::read_body_json(resp).await;
    assert_eq!(delta["kind"], "incremental");
    assert!(!delta["events"].as_array().expect("events").is_empty());

    let req = test::TestRequest::post()
        .uri(&format!("/api/tables/{id}/advance"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let report: Value = test::read_body_json(resp).await;
    assert_eq!(report["settled"], true);
    assert_eq!(report["steps"], json!([]));
    Ok(())
}

#[actix_web::test]
async fn bad_requests_are_problem_details() -> Result<(), AppError> {
    let (state, _sink) = test_state(EngineConfig::immediate()).await?;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let mut body = table_body();
    body["small_blind"] = json!(50);
    let req = test::TestRequest::post()
        .uri("/api/tables")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 422, "INVALID_TABLE_CONFIG").await;

    let req = test::TestRequest::get()
        .uri("/api/tables/9999/sync")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 404, "TABLE_NOT_FOUND").await;

    let req = test::TestRequest::post()
        .uri("/api/tables")
        .set_json(table_body())
        .to_request();
    let created: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = created["table"]["id"].as_i64().expect("table id");

    let req = test::TestRequest::post()
        .uri(&format!("/api/tables/{id}/seats"))
        .set_json(json!({ "player_id": 1, "seat_index": 5, "buy_in": 1000 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 422, "INVALID_SEAT").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/tables/{id}/actions"))
        .set_json(json!({ "player_id": 1, "action": "check" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, 422, "NO_ACTIVE_HAND").await;
    Ok(())
}

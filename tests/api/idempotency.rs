use catalog::domain::idempotency::{
    ClaimOutcome, Fingerprint, IdempotencyKey, IdempotencyStore, RecordKey,
};
use chrono::Utc;
use futures::future::join_all;
use poem::http::StatusCode;
use serde_json::json;

use crate::api::helpers::{body_bytes, body_json, get_test_app_with, header, new_key, studio};

crate::app_test!(retried_create_is_replayed_as_200, [app] {
    let key = new_key();
    let body = studio();

    let first = app.post_json("/v1/desenvolvedoras", Some(&key), &body).await;
    first.assert_status(StatusCode::CREATED);
    let location = header(&first, "Location");
    let first_body = body_bytes(first).await?;

    let second = app.post_json("/v1/desenvolvedoras", Some(&key), &body).await;
    second.assert_status_is_ok();
    assert_eq!(
        header(&second, "X-Idempotency-Status").as_deref(),
        Some("IDEMPOTENT_REPLAY")
    );
    assert_eq!(header(&second, "Location"), location);
    assert_eq!(body_bytes(second).await?, first_body);

    let all = body_json(app.get("/v1/desenvolvedoras").await).await?;
    assert_eq!(all.as_array().unwrap().len(), 1);
});

crate::app_test!(concurrent_creates_run_once, [app] {
    let body = json!({"nome": "Rockstar", "paisDeOrigem": "USA"});
    let responses = join_all(
        (0..2).map(|_| app.post_json("/v1/desenvolvedoras", Some("abc-123"), &body)),
    )
    .await;

    let mut created = 0;
    let mut replayed = 0;
    let mut bodies = Vec::new();
    for resp in responses {
        match resp.0.status() {
            StatusCode::CREATED => created += 1,
            StatusCode::OK => {
                assert_eq!(
                    header(&resp, "X-Idempotency-Status").as_deref(),
                    Some("IDEMPOTENT_REPLAY")
                );
                replayed += 1;
            }
            other => panic!("unexpected status {other}"),
        }
        bodies.push(body_json(resp).await?);
    }
    assert_eq!((created, replayed), (1, 1));
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["nome"], "Rockstar");

    let all = body_json(app.get("/v1/desenvolvedoras").await).await?;
    assert_eq!(all.as_array().unwrap().len(), 1);
});

crate::app_test!(many_concurrent_retries_create_one_record, [app] {
    let key = new_key();
    let body = studio();
    let responses = join_all(
        (0..16).map(|_| app.post_json("/v1/desenvolvedoras", Some(&key), &body)),
    )
    .await;

    let created = responses
        .iter()
        .filter(|resp| resp.0.status() == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);
    assert!(responses.iter().all(|resp| resp.0.status().is_success()));

    let all = body_json(app.get("/v1/desenvolvedoras").await).await?;
    assert_eq!(all.as_array().unwrap().len(), 1);
});

crate::app_test!(reused_key_with_another_payload_conflicts, [app] {
    let key = new_key();
    app.post_json("/v1/generos", Some(&key), &json!({"nome": "RPG"}))
        .await
        .assert_status(StatusCode::CREATED);

    let resp = app
        .post_json("/v1/generos", Some(&key), &json!({"nome": "Puzzle"}))
        .await;
    resp.assert_status(StatusCode::CONFLICT);
    let body = body_json(resp).await?;
    assert!(body["message"].as_str().unwrap().contains("different request payload"));
});

crate::app_test!(formatting_does_not_change_the_payload, [app] {
    let key = new_key();
    app.cli
        .post("/v1/generos")
        .header("X-Idempotency-Key", key.as_str())
        .content_type("application/json")
        .body(r#"{"nome":"RPG","descricao":"dice"}"#)
        .send()
        .await
        .assert_status(StatusCode::CREATED);

    let resp = app
        .cli
        .post("/v1/generos")
        .header("X-Idempotency-Key", key.as_str())
        .content_type("application/json")
        .body("{\n  \"descricao\": \"dice\",\n  \"nome\": \"RPG\"\n}")
        .send()
        .await;
    resp.assert_status_is_ok();
    assert_eq!(
        header(&resp, "X-Idempotency-Status").as_deref(),
        Some("IDEMPOTENT_REPLAY")
    );
});

crate::app_test!(mutations_require_a_key, [app] {
    let resp = app.post_json("/v1/jogos", None, &json!({"titulo": "Doom", "anoLancamento": 1993})).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body = body_json(resp).await?;
    assert_eq!(body["message"], "the X-Idempotency-Key header is required");

    app.post_json("/v1/jogos", Some("  "), &json!({"titulo": "Doom", "anoLancamento": 1993}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.put_json("/v1/jogos/1", None, &json!({"titulo": "Doom", "anoLancamento": 1993}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.delete("/v1/jogos/1", None)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let too_long = "k".repeat(256);
    app.post_json("/v1/jogos", Some(&too_long), &json!({"titulo": "Doom", "anoLancamento": 1993}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let all = body_json(app.get("/v1/jogos").await).await?;
    assert_eq!(all, json!([]));
    assert_eq!(app.stored_idempotency_records(), 0);
});

crate::app_test!(failed_mutation_does_not_burn_the_key, [app] {
    let key = new_key();
    let body = json!({"titulo": "Doom", "anoLancamento": 1993});

    app.put_json("/v1/jogos/1", Some(&key), &body)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.stored_idempotency_records(), 0);

    app.create("/v1/jogos", &json!({"titulo": "Quake", "anoLancamento": 1996})).await?;
    let resp = app.put_json("/v1/jogos/1", Some(&key), &body).await;
    resp.assert_status_is_ok();
    assert!(header(&resp, "X-Idempotency-Status").is_none());
    assert_eq!(body_json(resp).await?["titulo"], "Doom");
});

crate::app_test!(validation_failure_does_not_burn_the_key, [app] {
    let key = new_key();
    app.post_json("/v1/jogos", Some(&key), &json!({"titulo": "Pong", "anoLancamento": 1972}))
        .await
        .assert_status(StatusCode::CREATED);
    let key = new_key();
    let invalid = json!({"titulo": "Spacewar!", "anoLancamento": 1862});
    app.post_json("/v1/jogos", Some(&key), &invalid)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    // the same rejected payload is evaluated again, not replayed
    let resp = app.post_json("/v1/jogos", Some(&key), &invalid).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert!(header(&resp, "X-Idempotency-Status").is_none());
});

crate::app_test!(delete_is_replayed_with_204, [app] {
    app.create("/v1/generos", &json!({"nome": "Racing"})).await?;
    let key = new_key();

    app.delete("/v1/generos/1", Some(&key))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let resp = app.delete("/v1/generos/1", Some(&key)).await;
    resp.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(
        header(&resp, "X-Idempotency-Status").as_deref(),
        Some("IDEMPOTENT_REPLAY")
    );

    // a new key runs the delete again
    app.delete("/v1/generos/1", Some(&new_key()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
});

crate::app_test!(same_key_on_different_targets_is_independent, [app] {
    app.create("/v1/jogos", &json!({"titulo": "Doom", "anoLancamento": 1993})).await?;
    app.create("/v1/jogos", &json!({"titulo": "Quake", "anoLancamento": 1996})).await?;
    let key = new_key();
    let body = json!({"titulo": "Renamed", "anoLancamento": 2000});

    for id in [1, 2] {
        let resp = app.put_json(&format!("/v1/jogos/{id}"), Some(&key), &body).await;
        resp.assert_status_is_ok();
        assert!(header(&resp, "X-Idempotency-Status").is_none());
    }
    // and across resources
    app.post_json("/v1/generos", Some(&key), &json!({"nome": "Renamed"}))
        .await
        .assert_status(StatusCode::CREATED);
    assert_eq!(app.stored_idempotency_records(), 5);
});

#[tokio::test]
async fn key_still_in_progress_asks_the_client_to_retry() -> anyhow::Result<()> {
    let app = get_test_app_with(|conf| conf.idempotency.max_wait_ms = 0).await?;
    let store = app.idempotency_store.clone().unwrap();
    let key = new_key();
    let body = json!({"nome": "Strategy"});

    // another request holds the key and has not finished yet
    let record_key = RecordKey::new("POST /v1/generos", IdempotencyKey::parse(Some(&key))?);
    let now = Utc::now();
    let cutoffs = catalog::configuration::IdempotencySettings::default()
        .expiry_policy()
        .cutoffs(now);
    let fingerprint = Fingerprint::of_body(&serde_json::to_vec(&body)?);
    let claim = store
        .try_claim(&record_key, Some(&fingerprint), now, cutoffs)
        .await?;
    assert!(matches!(claim, ClaimOutcome::Claimed(_)));

    let resp = app.post_json("/v1/generos", Some(&key), &body).await;
    resp.assert_status(StatusCode::CONFLICT);
    assert_eq!(header(&resp, "Retry-After").as_deref(), Some("1"));
    assert!(header(&resp, "X-Idempotency-Status").is_none());
    let message = body_json(resp).await?;
    assert!(message["message"].as_str().unwrap().contains("still being processed"));

    // nothing was created behind the claim
    let all = body_json(app.get("/v1/generos").await).await?;
    assert_eq!(all, json!([]));
    Ok(())
}

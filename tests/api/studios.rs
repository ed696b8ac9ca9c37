use chrono::{Duration, Utc};
use poem::http::StatusCode;
use serde_json::json;

use crate::api::helpers::{body_json, header, new_key, studio};

crate::app_test!(create_returns_201_with_location, [app] {
    let resp = app
        .post_json(
            "/v1/desenvolvedoras",
            Some(&new_key()),
            &json!({"nome": "Rockstar", "paisDeOrigem": "USA", "dataDeFundacao": "1998-12-01"}),
        )
        .await;
    resp.assert_status(StatusCode::CREATED);
    assert_eq!(header(&resp, "Location").as_deref(), Some("/v1/desenvolvedoras/1"));
    assert!(header(&resp, "X-Idempotency-Status").is_none());

    let body = body_json(resp).await?;
    assert_eq!(
        body,
        json!({"id": 1, "nome": "Rockstar", "dataDeFundacao": "1998-12-01", "paisDeOrigem": "USA"})
    );
});

crate::app_test!(get_returns_the_record_or_404, [app] {
    let created = app.create("/v1/desenvolvedoras", &studio()).await?;
    let resp = app.get("/v1/desenvolvedoras/1").await;
    resp.assert_status_is_ok();
    assert_eq!(body_json(resp).await?, created);

    let resp = app.get("/v1/desenvolvedoras/99").await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body = body_json(resp).await?;
    assert!(body["message"].as_str().unwrap().contains("99"));
});

crate::app_test!(invalid_studios_are_rejected, [app] {
    let tomorrow = (Utc::now().date_naive() + Duration::days(1)).to_string();
    let invalid = [
        json!({"nome": "", "paisDeOrigem": "USA"}),
        json!({"nome": "Rockstar", "paisDeOrigem": "   "}),
        json!({"paisDeOrigem": "USA"}),
        json!({"nome": "Rockstar", "paisDeOrigem": "USA", "dataDeFundacao": tomorrow}),
    ];
    for body in invalid {
        let resp = app.post_json("/v1/desenvolvedoras", Some(&new_key()), &body).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body = body_json(resp).await?;
        assert!(body["message"].is_string(), "{body}");
    }
    let resp = app.get("/v1/desenvolvedoras").await;
    assert_eq!(body_json(resp).await?, json!([]));
});

crate::app_test!(update_replaces_every_field, [app] {
    app.create(
        "/v1/desenvolvedoras",
        &json!({"nome": "Rockstar", "paisDeOrigem": "USA", "dataDeFundacao": "1998-12-01"}),
    )
    .await?;

    let resp = app
        .put_json(
            "/v1/desenvolvedoras/1",
            Some(&new_key()),
            &json!({"nome": "Rockstar Games", "paisDeOrigem": "USA"}),
        )
        .await;
    resp.assert_status_is_ok();
    let body = body_json(resp).await?;
    assert_eq!(body["nome"], "Rockstar Games");
    assert!(body["dataDeFundacao"].is_null());

    let resp = app
        .put_json("/v1/desenvolvedoras/7", Some(&new_key()), &studio())
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
});

crate::app_test!(delete_returns_204_then_404, [app] {
    app.create("/v1/desenvolvedoras", &studio()).await?;

    let resp = app.delete("/v1/desenvolvedoras/1", Some(&new_key())).await;
    resp.assert_status(StatusCode::NO_CONTENT);
    app.get("/v1/desenvolvedoras/1").await.assert_status(StatusCode::NOT_FOUND);

    let resp = app.delete("/v1/desenvolvedoras/1", Some(&new_key())).await;
    resp.assert_status(StatusCode::NOT_FOUND);
});

crate::app_test!(list_is_ordered_by_id, [app] {
    for _ in 0..3 {
        app.create("/v1/desenvolvedoras", &studio()).await?;
    }
    let body = body_json(app.get("/v1/desenvolvedoras").await).await?;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [1, 2, 3]);
});

crate::app_test!(search_uses_the_studio_envelope, [app] {
    for (nome, pais) in [("Rockstar", "USA"), ("Nintendo", "Japan"), ("Rocksteady", "UK")] {
        app.create("/v1/desenvolvedoras", &json!({"nome": nome, "paisDeOrigem": pais}))
            .await?;
    }

    let resp = app.get("/v1/desenvolvedoras/search?q=rock&sort=nome&direction=DESC").await;
    resp.assert_status_is_ok();
    let body = body_json(resp).await?;
    assert_eq!(body["TotalDesenvolvedoras"], 2);
    assert_eq!(body["TotalPages"], 1);
    assert_eq!(body["HasMore"], false);
    assert_eq!(body["NextPage"], "");
    assert_eq!(body["Desenvolvedoras"][0]["nome"], "Rocksteady");
    assert_eq!(body["Desenvolvedoras"][1]["nome"], "Rockstar");

    // the country is searched too
    let body = body_json(app.get("/v1/desenvolvedoras/search?q=japan").await).await?;
    assert_eq!(body["TotalDesenvolvedoras"], 1);
    assert_eq!(body["Desenvolvedoras"][0]["nome"], "Nintendo");
});

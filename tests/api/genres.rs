use fake::faker::lorem::en::Sentence;
use fake::Fake;
use poem::http::StatusCode;
use serde_json::json;

use crate::api::helpers::{body_json, header, new_key};

crate::app_test!(genre_crud_round, [app] {
    let resp = app
        .post_json("/v1/generos", Some(&new_key()), &json!({"nome": "RPG"}))
        .await;
    resp.assert_status(StatusCode::CREATED);
    assert_eq!(header(&resp, "Location").as_deref(), Some("/v1/generos/1"));

    let descricao: String = Sentence(3..8).fake();
    let resp = app
        .put_json(
            "/v1/generos/1",
            Some(&new_key()),
            &json!({"nome": "Role-playing", "descricao": descricao}),
        )
        .await;
    resp.assert_status_is_ok();
    assert_eq!(
        body_json(resp).await?,
        json!({"id": 1, "nome": "Role-playing", "descricao": descricao})
    );

    app.delete("/v1/generos/1", Some(&new_key()))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.get("/v1/generos/1").await.assert_status(StatusCode::NOT_FOUND);
});

crate::app_test!(genre_lengths_are_bounded, [app] {
    let invalid = [
        json!({"nome": "a".repeat(51)}),
        json!({"nome": "RPG", "descricao": "d".repeat(201)}),
        json!({"descricao": "no name"}),
    ];
    for body in invalid {
        app.post_json("/v1/generos", Some(&new_key()), &body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    // limits are counted in characters, not bytes
    app.post_json("/v1/generos", Some(&new_key()), &json!({"nome": "ç".repeat(50)}))
        .await
        .assert_status(StatusCode::CREATED);
});

crate::app_test!(genre_search_looks_into_descriptions, [app] {
    app.create("/v1/generos", &json!({"nome": "Shooter", "descricao": "Fast paced action"}))
        .await?;
    app.create("/v1/generos", &json!({"nome": "Puzzle"})).await?;
    app.create("/v1/generos", &json!({"nome": "Action RPG"})).await?;

    let body = body_json(app.get("/v1/generos/search?q=ACTION").await).await?;
    assert_eq!(body["TotalGeneros"], 2);
    let names: Vec<&str> = body["Generos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["nome"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Shooter", "Action RPG"]);

    // blank text lists everything
    let body = body_json(app.get("/v1/generos/search?q=%20").await).await?;
    assert_eq!(body["TotalGeneros"], 3);
});

crate::app_test!(reads_never_touch_the_idempotency_store, [app] {
    app.create("/v1/generos", &json!({"nome": "Puzzle"})).await?;
    let before = app.stored_idempotency_records();

    let key = new_key();
    for path in ["/v1/generos", "/v1/generos/1", "/v1/generos/search?q=puz"] {
        let resp = app
            .cli
            .get(path)
            .header("X-Idempotency-Key", key.as_str())
            .send()
            .await;
        resp.assert_status_is_ok();
        assert!(header(&resp, "X-Idempotency-Status").is_none());
    }
    assert_eq!(app.stored_idempotency_records(), before);
});

use poem::http::StatusCode;
use serde_json::{json, Value};

use crate::api::helpers::{body_json, new_key, TestApp};

async fn seed(app: &TestApp) -> anyhow::Result<()> {
    for (titulo, ano) in [
        ("Zelda", 1986),
        ("Metroid", 1986),
        ("Doom", 1993),
        ("Portal", 2007),
        ("Celeste", 2018),
    ] {
        app.create("/v1/jogos", &json!({"titulo": titulo, "anoLancamento": ano}))
            .await?;
    }
    Ok(())
}

fn titles(body: &Value) -> Vec<&str> {
    body["Jogos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["titulo"].as_str().unwrap())
        .collect()
}

crate::app_test!(release_year_starts_in_1950, [app] {
    app.post_json("/v1/jogos", Some(&new_key()), &json!({"titulo": "Tennis", "anoLancamento": 1949}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.post_json("/v1/jogos", Some(&new_key()), &json!({"titulo": "Tennis"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.post_json("/v1/jogos", Some(&new_key()), &json!({"titulo": "Tennis", "anoLancamento": 1958}))
        .await
        .assert_status(StatusCode::CREATED);
});

crate::app_test!(title_and_description_are_bounded, [app] {
    let too_long = [
        json!({"titulo": "t".repeat(101), "anoLancamento": 2000}),
        json!({"titulo": "Doom", "descricao": "d".repeat(501), "anoLancamento": 1993}),
    ];
    for body in too_long {
        app.post_json("/v1/jogos", Some(&new_key()), &body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
});

crate::app_test!(search_defaults_to_four_per_page, [app] {
    seed(&app).await?;

    let body = body_json(app.get("/v1/jogos/search").await).await?;
    assert_eq!(titles(&body), ["Zelda", "Metroid", "Doom", "Portal"]);
    assert_eq!(body["TotalJogos"], 5);
    assert_eq!(body["TotalPages"], 2);
    assert_eq!(body["HasMore"], true);
    assert_eq!(body["NextPage"], "/v1/jogos/search?page=1&size=4");

    let body = body_json(app.get("/v1/jogos/search?page=1").await).await?;
    assert_eq!(titles(&body), ["Celeste"]);
    assert_eq!(body["HasMore"], false);
    assert_eq!(body["NextPage"], "");
});

crate::app_test!(search_sorts_by_any_field, [app] {
    seed(&app).await?;

    let body = body_json(
        app.get("/v1/jogos/search?sort=anoLancamento&direction=desc&size=2")
            .await,
    )
    .await?;
    assert_eq!(titles(&body), ["Celeste", "Portal"]);
    assert_eq!(body["TotalPages"], 3);
    assert_eq!(
        body["NextPage"],
        "/v1/jogos/search?page=1&size=2"
    );

    let body = body_json(app.get("/v1/jogos/search?sort=titulo").await).await?;
    assert_eq!(titles(&body), ["Celeste", "Doom", "Metroid", "Portal"]);
});

crate::app_test!(out_of_range_paging_is_clamped, [app] {
    seed(&app).await?;

    let body = body_json(app.get("/v1/jogos/search?page=-2&size=0").await).await?;
    assert_eq!(titles(&body), ["Zelda"]);
    assert_eq!(body["TotalPages"], 5);

    let body = body_json(app.get("/v1/jogos/search?size=1000").await).await?;
    assert_eq!(titles(&body).len(), 5);
    assert_eq!(body["HasMore"], false);
});

crate::app_test!(unknown_sort_field_is_a_bad_request, [app] {
    let resp = app.get("/v1/jogos/search?sort=preco").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body = body_json(resp).await?;
    assert_eq!(body["message"], "cannot sort by unknown field `preco`");
});

crate::app_test!(next_page_keeps_the_search_text, [app] {
    seed(&app).await?;
    for titulo in ["Doom II", "Doom 3", "Doom Eternal"] {
        app.create("/v1/jogos", &json!({"titulo": titulo, "anoLancamento": 2000}))
            .await?;
    }

    let body = body_json(app.get("/v1/jogos/search?q=doom&size=3").await).await?;
    assert_eq!(body["TotalJogos"], 4);
    assert_eq!(body["NextPage"], "/v1/jogos/search?q=doom&page=1&size=3");
});

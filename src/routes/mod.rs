pub mod error;
pub mod games;
pub mod genres;
pub mod health;
pub mod idempotency;
pub mod studios;

use poem::{get, middleware::Tracing, Endpoint, EndpointExt, Response, Route};
use poem_openapi::{ApiResponse, OpenApiService};

use crate::configuration::Configuration;
use crate::context::StateContext;
use crate::repository::SearchQuery;

use games::GamesApi;
use genres::GenresApi;
use health::health_check;
use studios::StudiosApi;

pub fn default_route(conf: &Configuration, context: StateContext) -> impl Endpoint<Output = Response> {
    let server_url = format!("http://{}:{}", conf.host, conf.app_port);
    let api_service = OpenApiService::new(
        (
            StudiosApi::new(context.studios.clone()),
            GenresApi::new(context.genres.clone()),
            GamesApi::new(context.games.clone()),
        ),
        "catalog",
        env!("CARGO_PKG_VERSION"),
    )
    .server(server_url);
    let ui = api_service.swagger_ui();
    let spec = api_service.spec_endpoint();

    Route::new()
        .at("/health_check", get(health_check))
        .at("/openapi.json", spec)
        .nest("/docs", ui)
        .nest("/", api_service)
        .data(context.idempotency)
}

pub fn add_tracing(ep: impl Endpoint) -> impl Endpoint {
    ep.with(Tracing)
}

/// Mutations run behind the idempotency guard.
pub fn idempotent(ep: impl Endpoint + 'static) -> impl Endpoint {
    add_tracing(ep.around(idempotency::guard_mutation))
}

#[derive(ApiResponse)]
pub enum DeleteResponse {
    #[oai(status = 204)]
    NoContent,
}

/// Link to the page after the current one, or `""` on the last page.
pub fn next_page_link(base: &str, query: &SearchQuery, has_more: bool) -> String {
    if !has_more {
        return String::new();
    }
    let mut params = Vec::with_capacity(3);
    if let Some(text) = &query.text {
        params.push(("q", text.clone()));
    }
    params.push(("page", (query.page + 1).to_string()));
    params.push(("size", query.size.to_string()));
    match serde_urlencoded::to_string(&params) {
        Ok(encoded) => format!("{base}/search?{encoded}"),
        Err(e) => {
            tracing::warn!(error = %e, "fail to encode the next page link");
            String::new()
        }
    }
}

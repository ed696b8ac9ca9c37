use std::sync::Arc;

use poem_openapi::{
    param::{Header, Path, Query},
    payload::Json,
    ApiResponse, Object, OpenApi,
};

use super::{add_tracing, error::ApiError, idempotent, next_page_link, DeleteResponse};
use crate::domain::{Game, NewGame};
use crate::repository::{Repository, SearchQuery};

const BASE_PATH: &str = "/v1/jogos";

pub struct GamesApi {
    repo: Arc<dyn Repository<Game>>,
}

impl GamesApi {
    pub fn new(repo: Arc<dyn Repository<Game>>) -> Self {
        Self { repo }
    }
}

#[derive(Debug, Object)]
#[oai(rename = "JogoInput")]
struct GamePayload {
    #[oai(rename = "titulo")]
    title: Option<String>,
    #[oai(rename = "descricao")]
    description: Option<String>,
    #[oai(rename = "anoLancamento")]
    release_year: Option<i32>,
}

impl TryFrom<GamePayload> for NewGame {
    type Error = String;

    fn try_from(payload: GamePayload) -> Result<Self, Self::Error> {
        let release_year = payload
            .release_year
            .ok_or_else(|| "anoLancamento is required".to_owned())?;
        NewGame::parse(
            payload.title.as_deref(),
            payload.description.as_deref(),
            release_year,
        )
    }
}

#[derive(Debug, Object)]
#[oai(rename = "PaginaJogos")]
struct GameSearchPage {
    #[oai(rename = "Jogos")]
    games: Vec<Game>,
    #[oai(rename = "TotalJogos")]
    total_games: u64,
    #[oai(rename = "TotalPages")]
    total_pages: u64,
    #[oai(rename = "HasMore")]
    has_more: bool,
    #[oai(rename = "NextPage")]
    next_page: String,
}

#[derive(ApiResponse)]
enum CreateGameResponse {
    #[oai(status = 201)]
    Created(Json<Game>, #[oai(header = "Location")] String),
}

#[OpenApi]
impl GamesApi {
    /// All games ordered by id
    #[oai(path = "/v1/jogos", method = "get", transform = "add_tracing")]
    async fn list_games(&self) -> Result<Json<Vec<Game>>, ApiError> {
        Ok(Json(self.repo.list().await?))
    }

    #[oai(path = "/v1/jogos/search", method = "get", transform = "add_tracing")]
    #[tracing::instrument(name = "search games", skip_all, fields(q = ?q.0, page = ?page.0, size = ?size.0))]
    async fn search_games(
        &self,
        q: Query<Option<String>>,
        sort: Query<Option<String>>,
        direction: Query<Option<String>>,
        page: Query<Option<i64>>,
        size: Query<Option<i64>>,
    ) -> Result<Json<GameSearchPage>, ApiError> {
        let query = SearchQuery::new(q.0, sort.0, direction.0.as_deref(), page.0, size.0);
        let found = self.repo.search(&query).await?;
        let has_more = found.has_more();
        Ok(Json(GameSearchPage {
            next_page: next_page_link(BASE_PATH, &query, has_more),
            total_games: found.total_items,
            total_pages: found.total_pages,
            has_more,
            games: found.items,
        }))
    }

    #[oai(path = "/v1/jogos/:id", method = "get", transform = "add_tracing")]
    async fn get_game(&self, id: Path<i64>) -> Result<Json<Game>, ApiError> {
        match self.repo.get(id.0).await? {
            Some(game) => Ok(Json(game)),
            None => Err(ApiError::not_found(format!("game {} not found", id.0))),
        }
    }

    #[oai(path = "/v1/jogos", method = "post", transform = "idempotent")]
    #[tracing::instrument(name = "create game", skip_all)]
    async fn create_game(
        &self,
        #[oai(name = "X-Idempotency-Key")]
        _idempotency_key: Header<String>,
        body: Json<GamePayload>,
    ) -> Result<CreateGameResponse, ApiError> {
        let draft = NewGame::try_from(body.0).map_err(ApiError::bad_request)?;
        let game = self.repo.create(draft).await?;
        tracing::info!(id = game.id, "game created");
        let location = format!("{BASE_PATH}/{}", game.id);
        Ok(CreateGameResponse::Created(Json(game), location))
    }

    #[oai(path = "/v1/jogos/:id", method = "put", transform = "idempotent")]
    #[tracing::instrument(name = "update game", skip_all, fields(id = id.0))]
    async fn update_game(
        &self,
        id: Path<i64>,
        #[oai(name = "X-Idempotency-Key")]
        _idempotency_key: Header<String>,
        body: Json<GamePayload>,
    ) -> Result<Json<Game>, ApiError> {
        let draft = NewGame::try_from(body.0).map_err(ApiError::bad_request)?;
        match self.repo.update(id.0, draft).await? {
            Some(game) => Ok(Json(game)),
            None => Err(ApiError::not_found(format!("game {} not found", id.0))),
        }
    }

    #[oai(path = "/v1/jogos/:id", method = "delete", transform = "idempotent")]
    #[tracing::instrument(name = "delete game", skip_all, fields(id = id.0))]
    async fn delete_game(
        &self,
        id: Path<i64>,
        #[oai(name = "X-Idempotency-Key")]
        _idempotency_key: Header<String>,
    ) -> Result<DeleteResponse, ApiError> {
        if self.repo.delete(id.0).await? {
            Ok(DeleteResponse::NoContent)
        } else {
            Err(ApiError::not_found(format!("game {} not found", id.0)))
        }
    }
}

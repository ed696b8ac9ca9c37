use std::sync::Arc;

use poem_openapi::{
    param::{Header, Path, Query},
    payload::Json,
    ApiResponse, Object, OpenApi,
};

use super::{add_tracing, error::ApiError, idempotent, next_page_link, DeleteResponse};
use crate::domain::{Genre, NewGenre};
use crate::repository::{Repository, SearchQuery};

const BASE_PATH: &str = "/v1/generos";

pub struct GenresApi {
    repo: Arc<dyn Repository<Genre>>,
}

impl GenresApi {
    pub fn new(repo: Arc<dyn Repository<Genre>>) -> Self {
        Self { repo }
    }
}

#[derive(Debug, Object)]
#[oai(rename = "GeneroInput")]
struct GenrePayload {
    #[oai(rename = "nome")]
    name: Option<String>,
    #[oai(rename = "descricao")]
    description: Option<String>,
}

impl TryFrom<GenrePayload> for NewGenre {
    type Error = String;

    fn try_from(payload: GenrePayload) -> Result<Self, Self::Error> {
        NewGenre::parse(payload.name.as_deref(), payload.description.as_deref())
    }
}

#[derive(Debug, Object)]
#[oai(rename = "PaginaGeneros")]
struct GenreSearchPage {
    #[oai(rename = "Generos")]
    genres: Vec<Genre>,
    #[oai(rename = "TotalGeneros")]
    total_genres: u64,
    #[oai(rename = "TotalPages")]
    total_pages: u64,
    #[oai(rename = "HasMore")]
    has_more: bool,
    #[oai(rename = "NextPage")]
    next_page: String,
}

#[derive(ApiResponse)]
enum CreateGenreResponse {
    #[oai(status = 201)]
    Created(Json<Genre>, #[oai(header = "Location")] String),
}

#[OpenApi]
impl GenresApi {
    /// All genres ordered by id
    #[oai(path = "/v1/generos", method = "get", transform = "add_tracing")]
    async fn list_genres(&self) -> Result<Json<Vec<Genre>>, ApiError> {
        Ok(Json(self.repo.list().await?))
    }

    #[oai(path = "/v1/generos/search", method = "get", transform = "add_tracing")]
    #[tracing::instrument(name = "search genres", skip_all, fields(q = ?q.0, page = ?page.0, size = ?size.0))]
    async fn search_genres(
        &self,
        q: Query<Option<String>>,
        sort: Query<Option<String>>,
        direction: Query<Option<String>>,
        page: Query<Option<i64>>,
        size: Query<Option<i64>>,
    ) -> Result<Json<GenreSearchPage>, ApiError> {
        let query = SearchQuery::new(q.0, sort.0, direction.0.as_deref(), page.0, size.0);
        let found = self.repo.search(&query).await?;
        let has_more = found.has_more();
        Ok(Json(GenreSearchPage {
            next_page: next_page_link(BASE_PATH, &query, has_more),
            total_genres: found.total_items,
            total_pages: found.total_pages,
            has_more,
            genres: found.items,
        }))
    }

    #[oai(path = "/v1/generos/:id", method = "get", transform = "add_tracing")]
    async fn get_genre(&self, id: Path<i64>) -> Result<Json<Genre>, ApiError> {
        match self.repo.get(id.0).await? {
            Some(genre) => Ok(Json(genre)),
            None => Err(ApiError::not_found(format!("genre {} not found", id.0))),
        }
    }

    #[oai(path = "/v1/generos", method = "post", transform = "idempotent")]
    #[tracing::instrument(name = "create genre", skip_all)]
    async fn create_genre(
        &self,
        #[oai(name = "X-Idempotency-Key")]
        _idempotency_key: Header<String>,
        body: Json<GenrePayload>,
    ) -> Result<CreateGenreResponse, ApiError> {
        let draft = NewGenre::try_from(body.0).map_err(ApiError::bad_request)?;
        let genre = self.repo.create(draft).await?;
        tracing::info!(id = genre.id, "genre created");
        let location = format!("{BASE_PATH}/{}", genre.id);
        Ok(CreateGenreResponse::Created(Json(genre), location))
    }

    #[oai(path = "/v1/generos/:id", method = "put", transform = "idempotent")]
    #[tracing::instrument(name = "update genre", skip_all, fields(id = id.0))]
    async fn update_genre(
        &self,
        id: Path<i64>,
        #[oai(name = "X-Idempotency-Key")]
        _idempotency_key: Header<String>,
        body: Json<GenrePayload>,
    ) -> Result<Json<Genre>, ApiError> {
        let draft = NewGenre::try_from(body.0).map_err(ApiError::bad_request)?;
        match self.repo.update(id.0, draft).await? {
            Some(genre) => Ok(Json(genre)),
            None => Err(ApiError::not_found(format!("genre {} not found", id.0))),
        }
    }

    #[oai(path = "/v1/generos/:id", method = "delete", transform = "idempotent")]
    #[tracing::instrument(name = "delete genre", skip_all, fields(id = id.0))]
    async fn delete_genre(
        &self,
        id: Path<i64>,
        #[oai(name = "X-Idempotency-Key")]
        _idempotency_key: Header<String>,
    ) -> Result<DeleteResponse, ApiError> {
        if self.repo.delete(id.0).await? {
            Ok(DeleteResponse::NoContent)
        } else {
            Err(ApiError::not_found(format!("genre {} not found", id.0)))
        }
    }
}

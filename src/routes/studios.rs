use std::sync::Arc;

use chrono::NaiveDate;
use poem_openapi::{
    param::{Header, Path, Query},
    payload::Json,
    ApiResponse, Object, OpenApi,
};

use super::{add_tracing, error::ApiError, idempotent, next_page_link, DeleteResponse};
use crate::domain::{NewStudio, Studio};
use crate::repository::{Repository, SearchQuery};

const BASE_PATH: &str = "/v1/desenvolvedoras";

pub struct StudiosApi {
    repo: Arc<dyn Repository<Studio>>,
}

impl StudiosApi {
    pub fn new(repo: Arc<dyn Repository<Studio>>) -> Self {
        Self { repo }
    }
}

#[derive(Debug, Object)]
#[oai(rename = "DesenvolvedoraInput")]
struct StudioPayload {
    #[oai(rename = "nome")]
    name: Option<String>,
    #[oai(rename = "dataDeFundacao")]
    founded_on: Option<NaiveDate>,
    #[oai(rename = "paisDeOrigem")]
    country_of_origin: Option<String>,
}

impl TryFrom<StudioPayload> for NewStudio {
    type Error = String;

    fn try_from(payload: StudioPayload) -> Result<Self, Self::Error> {
        NewStudio::parse(
            payload.name.as_deref(),
            payload.founded_on,
            payload.country_of_origin.as_deref(),
        )
    }
}

#[derive(Debug, Object)]
#[oai(rename = "PaginaDesenvolvedoras")]
struct StudioSearchPage {
    #[oai(rename = "Desenvolvedoras")]
    studios: Vec<Studio>,
    #[oai(rename = "TotalDesenvolvedoras")]
    total_studios: u64,
    #[oai(rename = "TotalPages")]
    total_pages: u64,
    #[oai(rename = "HasMore")]
    has_more: bool,
    #[oai(rename = "NextPage")]
    next_page: String,
}

#[derive(ApiResponse)]
enum CreateStudioResponse {
    #[oai(status = 201)]
    Created(Json<Studio>, #[oai(header = "Location")] String),
}

#[OpenApi]
impl StudiosApi {
    /// All studios ordered by id
    #[oai(path = "/v1/desenvolvedoras", method = "get", transform = "add_tracing")]
    async fn list_studios(&self) -> Result<Json<Vec<Studio>>, ApiError> {
        Ok(Json(self.repo.list().await?))
    }

    #[oai(path = "/v1/desenvolvedoras/search", method = "get", transform = "add_tracing")]
    #[tracing::instrument(name = "search studios", skip_all, fields(q = ?q.0, page = ?page.0, size = ?size.0))]
    async fn search_studios(
        &self,
        q: Query<Option<String>>,
        sort: Query<Option<String>>,
        direction: Query<Option<String>>,
        page: Query<Option<i64>>,
        size: Query<Option<i64>>,
    ) -> Result<Json<StudioSearchPage>, ApiError> {
        let query = SearchQuery::new(q.0, sort.0, direction.0.as_deref(), page.0, size.0);
        let found = self.repo.search(&query).await?;
        let has_more = found.has_more();
        Ok(Json(StudioSearchPage {
            next_page: next_page_link(BASE_PATH, &query, has_more),
            total_studios: found.total_items,
            total_pages: found.total_pages,
            has_more,
            studios: found.items,
        }))
    }

    #[oai(path = "/v1/desenvolvedoras/:id", method = "get", transform = "add_tracing")]
    async fn get_studio(&self, id: Path<i64>) -> Result<Json<Studio>, ApiError> {
        match self.repo.get(id.0).await? {
            Some(studio) => Ok(Json(studio)),
            None => Err(ApiError::not_found(format!("studio {} not found", id.0))),
        }
    }

    #[oai(path = "/v1/desenvolvedoras", method = "post", transform = "idempotent")]
    #[tracing::instrument(name = "create studio", skip_all)]
    async fn create_studio(
        &self,
        #[oai(name = "X-Idempotency-Key")]
        _idempotency_key: Header<String>,
        body: Json<StudioPayload>,
    ) -> Result<CreateStudioResponse, ApiError> {
        let draft = NewStudio::try_from(body.0).map_err(ApiError::bad_request)?;
        let studio = self.repo.create(draft).await?;
        tracing::info!(id = studio.id, "studio created");
        let location = format!("{BASE_PATH}/{}", studio.id);
        Ok(CreateStudioResponse::Created(Json(studio), location))
    }

    #[oai(path = "/v1/desenvolvedoras/:id", method = "put", transform = "idempotent")]
    #[tracing::instrument(name = "update studio", skip_all, fields(id = id.0))]
    async fn update_studio(
        &self,
        id: Path<i64>,
        #[oai(name = "X-Idempotency-Key")]
        _idempotency_key: Header<String>,
        body: Json<StudioPayload>,
    ) -> Result<Json<Studio>, ApiError> {
        let draft = NewStudio::try_from(body.0).map_err(ApiError::bad_request)?;
        match self.repo.update(id.0, draft).await? {
            Some(studio) => Ok(Json(studio)),
            None => Err(ApiError::not_found(format!("studio {} not found", id.0))),
        }
    }

    #[oai(path = "/v1/desenvolvedoras/:id", method = "delete", transform = "idempotent")]
    #[tracing::instrument(name = "delete studio", skip_all, fields(id = id.0))]
    async fn delete_studio(
        &self,
        id: Path<i64>,
        #[oai(name = "X-Idempotency-Key")]
        _idempotency_key: Header<String>,
    ) -> Result<DeleteResponse, ApiError> {
        if self.repo.delete(id.0).await? {
            Ok(DeleteResponse::NoContent)
        } else {
            Err(ApiError::not_found(format!("studio {} not found", id.0)))
        }
    }
}

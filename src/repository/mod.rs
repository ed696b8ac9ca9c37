use async_trait::async_trait;

use crate::domain::Resource;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

pub const DEFAULT_SORT_FIELD: &str = "id";
pub const DEFAULT_PAGE_SIZE: u64 = 4;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest row offset a page may start at; Postgres `OFFSET` is a bigint.
const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("cannot sort by unknown field `{0}`")]
    UnknownSortField(String),
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything but a case-insensitive `desc` sorts ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) if raw.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub sort: String,
    pub direction: SortDirection,
    pub page: u64,
    pub size: u64,
}

impl SearchQuery {
    pub fn new(
        text: Option<String>,
        sort: Option<String>,
        direction: Option<&str>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Self {
        let sort = sort
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SORT_FIELD.to_owned());
        let size = size
            .map(|size| size.clamp(1, MAX_PAGE_SIZE as i64) as u64)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        // page * size must stay a valid offset
        let page = (page.unwrap_or(0).max(0) as u64).min(MAX_OFFSET / size);
        Self {
            text,
            sort,
            direction: SortDirection::parse(direction),
            page,
            size,
        }
    }

    /// The lowercased search text, or `None` when every record matches.
    /// Surrounding spaces are part of the text; only a blank text matches all.
    pub fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(str::to_lowercase)
    }

    /// Number of matching rows before this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new(None, None, None, None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
    pub page: u64,
    pub size: u64,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.page + 1 < self.total_pages
    }
}

fn total_pages(total_items: u64, size: u64) -> u64 {
    (total_items + size - 1) / size
}

/// Storage of one catalog resource.
#[async_trait]
pub trait Repository<T: Resource>: Send + Sync {
    /// Every record, ordered by id.
    async fn list(&self) -> Result<Vec<T>, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Option<T>, RepositoryError>;

    async fn search(&self, query: &SearchQuery) -> Result<Page<T>, RepositoryError>;

    async fn create(&self, draft: T::Draft) -> Result<T, RepositoryError>;

    /// Replaces every field of an existing record. `None` when `id` is unknown.
    async fn update(&self, id: i64, draft: T::Draft) -> Result<Option<T>, RepositoryError>;

    /// Returns whether a record was deleted.
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

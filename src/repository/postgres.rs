use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use super::{total_pages, Page, Repository, RepositoryError, SearchQuery, SortDirection};
use crate::domain::{Game, Genre, Studio};
use crate::entities::{games, genres, studios};

/// Catalog tables through sea-orm.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    db: DatabaseConnection,
}

impl PostgresRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// `%needle%` with the LIKE wildcards of the needle escaped.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

macro_rules! impl_postgres_repository {
    ($resource:ty, $entity:ident) => {
        #[async_trait]
        impl Repository<$resource> for PostgresRepository {
            #[tracing::instrument(skip(self))]
            async fn list(&self) -> Result<Vec<$resource>, RepositoryError> {
                let models = $entity::Entity::find()
                    .order_by_asc($entity::Column::Id)
                    .all(&self.db)
                    .await?;
                Ok(models.into_iter().map(Into::into).collect())
            }

            #[tracing::instrument(skip(self))]
            async fn get(&self, id: i64) -> Result<Option<$resource>, RepositoryError> {
                let model = $entity::Entity::find_by_id(id).one(&self.db).await?;
                Ok(model.map(Into::into))
            }

            #[tracing::instrument(skip(self))]
            async fn search(
                &self,
                query: &SearchQuery,
            ) -> Result<Page<$resource>, RepositoryError> {
                let column = $entity::sort_column(&query.sort)
                    .ok_or_else(|| RepositoryError::UnknownSortField(query.sort.clone()))?;
                let mut select = $entity::Entity::find();
                if let Some(needle) = query.needle() {
                    let pattern = like_pattern(&needle);
                    let condition = $entity::SEARCH_COLUMNS.iter().fold(
                        Condition::any(),
                        |condition, column| {
                            condition.add(
                                Expr::expr(Func::lower(Expr::col(*column)))
                                    .like(pattern.as_str()),
                            )
                        },
                    );
                    select = select.filter(condition);
                }
                let paginator = select
                    .order_by(column, query.direction.into())
                    .order_by_asc($entity::Column::Id)
                    .paginate(&self.db, query.size);
                let total_items = paginator.num_items().await? as u64;
                let models = paginator.fetch_page(query.page).await?;
                Ok(Page {
                    items: models.into_iter().map(Into::into).collect(),
                    total_items,
                    total_pages: total_pages(total_items, query.size),
                    page: query.page,
                    size: query.size,
                })
            }

            #[tracing::instrument(skip(self))]
            async fn create(
                &self,
                draft: <$resource as crate::domain::Resource>::Draft,
            ) -> Result<$resource, RepositoryError> {
                let model: $entity::ActiveModel = draft.into();
                let model = model.insert(&self.db).await?;
                Ok(model.into())
            }

            #[tracing::instrument(skip(self))]
            async fn update(
                &self,
                id: i64,
                draft: <$resource as crate::domain::Resource>::Draft,
            ) -> Result<Option<$resource>, RepositoryError> {
                let Some(model) = $entity::Entity::find_by_id(id).one(&self.db).await? else {
                    return Ok(None);
                };
                let mut model: $entity::ActiveModel = model.into();
                $entity::apply_draft(&mut model, draft);
                let model = model.update(&self.db).await?;
                Ok(Some(model.into()))
            }

            #[tracing::instrument(skip(self))]
            async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
                let res = $entity::Entity::delete_by_id(id).exec(&self.db).await?;
                Ok(res.rows_affected > 0)
            }
        }
    };
}

impl_postgres_repository!(Studio, studios);
impl_postgres_repository!(Genre, genres);
impl_postgres_repository!(Game, games);

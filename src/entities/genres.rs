use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;

use crate::domain::{Genre, NewGenre};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "generos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub nome: String,
    pub descricao: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Genre {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.nome,
            description: m.descricao,
        }
    }
}

impl From<NewGenre> for ActiveModel {
    fn from(draft: NewGenre) -> Self {
        let mut model = <ActiveModel as ActiveModelTrait>::default();
        apply_draft(&mut model, draft);
        model
    }
}

pub fn apply_draft(model: &mut ActiveModel, draft: NewGenre) {
    model.nome = ActiveValue::Set(draft.name.inner());
    model.descricao = ActiveValue::Set(draft.description.map(|d| d.inner()));
}

pub fn sort_column(field: &str) -> Option<Column> {
    match field {
        "id" => Some(Column::Id),
        "nome" => Some(Column::Nome),
        "descricao" => Some(Column::Descricao),
        _ => None,
    }
}

pub const SEARCH_COLUMNS: [Column; 2] = [Column::Nome, Column::Descricao];

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;

use crate::domain::{Game, NewGame};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "jogos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub titulo: String,
    pub descricao: Option<String>,
    pub ano_lancamento: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Game {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            title: m.titulo,
            description: m.descricao,
            release_year: m.ano_lancamento,
        }
    }
}

impl From<NewGame> for ActiveModel {
    fn from(draft: NewGame) -> Self {
        let mut model = <ActiveModel as ActiveModelTrait>::default();
        apply_draft(&mut model, draft);
        model
    }
}

pub fn apply_draft(model: &mut ActiveModel, draft: NewGame) {
    model.titulo = ActiveValue::Set(draft.title.inner());
    model.descricao = ActiveValue::Set(draft.description.map(|d| d.inner()));
    model.ano_lancamento = ActiveValue::Set(draft.release_year);
}

pub fn sort_column(field: &str) -> Option<Column> {
    match field {
        "id" => Some(Column::Id),
        "titulo" => Some(Column::Titulo),
        "descricao" => Some(Column::Descricao),
        "anoLancamento" => Some(Column::AnoLancamento),
        _ => None,
    }
}

pub const SEARCH_COLUMNS: [Column; 2] = [Column::Titulo, Column::Descricao];

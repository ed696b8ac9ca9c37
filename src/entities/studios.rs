use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;

use crate::domain::{NewStudio, Studio};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "desenvolvedoras")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub nome: String,
    pub data_de_fundacao: Option<Date>,
    pub pais_de_origem: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Studio {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.nome,
            founded_on: m.data_de_fundacao,
            country_of_origin: m.pais_de_origem,
        }
    }
}

impl From<NewStudio> for ActiveModel {
    fn from(draft: NewStudio) -> Self {
        let mut model = <ActiveModel as ActiveModelTrait>::default();
        apply_draft(&mut model, draft);
        model
    }
}

pub fn apply_draft(model: &mut ActiveModel, draft: NewStudio) {
    model.nome = ActiveValue::Set(draft.name.inner());
    model.data_de_fundacao = ActiveValue::Set(draft.founded_on);
    model.pais_de_origem = ActiveValue::Set(draft.country_of_origin.inner());
}

/// Maps a JSON sort field onto its column.
pub fn sort_column(field: &str) -> Option<Column> {
    match field {
        "id" => Some(Column::Id),
        "nome" => Some(Column::Nome),
        "dataDeFundacao" => Some(Column::DataDeFundacao),
        "paisDeOrigem" => Some(Column::PaisDeOrigem),
        _ => None,
    }
}

/// Columns the free-text search looks into.
pub const SEARCH_COLUMNS: [Column; 2] = [Column::Nome, Column::PaisDeOrigem];

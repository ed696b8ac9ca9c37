use std::cmp::Ordering;

use poem_openapi::Object;

use super::{contains_lowercase, BoundedText, Resource};

const MAX_NAME_LENGTH: usize = 50;
const MAX_DESCRIPTION_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Object)]
#[oai(rename = "Genero")]
pub struct Genre {
    #[oai(read_only)]
    pub id: i64,
    #[oai(rename = "nome")]
    pub name: String,
    #[oai(rename = "descricao")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGenre {
    pub name: BoundedText,
    pub description: Option<BoundedText>,
}

impl NewGenre {
    pub fn parse(name: Option<&str>, description: Option<&str>) -> Result<Self, String> {
        Ok(Self {
            name: BoundedText::required("nome", name, MAX_NAME_LENGTH)?,
            description: BoundedText::optional("descricao", description, MAX_DESCRIPTION_LENGTH)?,
        })
    }
}

impl Resource for Genre {
    type Draft = NewGenre;

    const SORT_FIELDS: &'static [&'static str] = &["id", "nome", "descricao"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewGenre) -> Self {
        Self {
            id,
            name: draft.name.inner(),
            description: draft.description.map(BoundedText::inner),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        contains_lowercase(&self.name, needle)
            || self
                .description
                .as_deref()
                .map_or(false, |description| contains_lowercase(description, needle))
    }

    fn compare_by(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "nome" => self.name.cmp(&other.name),
            "descricao" => self.description.cmp(&other.description),
            _ => self.id.cmp(&other.id),
        }
    }
}

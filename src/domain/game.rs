use std::cmp::Ordering;

use poem_openapi::Object;

use super::{contains_lowercase, BoundedText, Resource};

const MAX_TITLE_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;
const FIRST_RELEASE_YEAR: i32 = 1950;

#[derive(Debug, Clone, PartialEq, Eq, Object)]
#[oai(rename = "Jogo")]
pub struct Game {
    #[oai(read_only)]
    pub id: i64,
    #[oai(rename = "titulo")]
    pub title: String,
    #[oai(rename = "descricao")]
    pub description: Option<String>,
    #[oai(rename = "anoLancamento")]
    pub release_year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub title: BoundedText,
    pub description: Option<BoundedText>,
    pub release_year: i32,
}

impl NewGame {
    pub fn parse(
        title: Option<&str>,
        description: Option<&str>,
        release_year: i32,
    ) -> Result<Self, String> {
        let title = BoundedText::required("titulo", title, MAX_TITLE_LENGTH)?;
        let description =
            BoundedText::optional("descricao", description, MAX_DESCRIPTION_LENGTH)?;
        if release_year < FIRST_RELEASE_YEAR {
            return Err(format!(
                "anoLancamento must be {FIRST_RELEASE_YEAR} or later"
            ));
        }
        Ok(Self {
            title,
            description,
            release_year,
        })
    }
}

impl Resource for Game {
    type Draft = NewGame;

    const SORT_FIELDS: &'static [&'static str] = &["id", "titulo", "descricao", "anoLancamento"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewGame) -> Self {
        Self {
            id,
            title: draft.title.inner(),
            description: draft.description.map(BoundedText::inner),
            release_year: draft.release_year,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        contains_lowercase(&self.title, needle)
            || self
                .description
                .as_deref()
                .map_or(false, |description| contains_lowercase(description, needle))
    }

    fn compare_by(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "titulo" => self.title.cmp(&other.title),
            "descricao" => self.description.cmp(&other.description),
            "anoLancamento" => self.release_year.cmp(&other.release_year),
            _ => self.id.cmp(&other.id),
        }
    }
}

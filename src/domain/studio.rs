use std::cmp::Ordering;

use chrono::{NaiveDate, Utc};
use poem_openapi::Object;

use super::{contains_lowercase, BoundedText, Resource};

/// Column length used by the original schema for unconstrained text.
const MAX_TEXT_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Object)]
#[oai(rename = "Desenvolvedora")]
pub struct Studio {
    #[oai(read_only)]
    pub id: i64,
    #[oai(rename = "nome")]
    pub name: String,
    #[oai(rename = "dataDeFundacao")]
    pub founded_on: Option<NaiveDate>,
    #[oai(rename = "paisDeOrigem")]
    pub country_of_origin: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudio {
    pub name: BoundedText,
    pub founded_on: Option<NaiveDate>,
    pub country_of_origin: BoundedText,
}

impl NewStudio {
    pub fn parse(
        name: Option<&str>,
        founded_on: Option<NaiveDate>,
        country_of_origin: Option<&str>,
    ) -> Result<Self, String> {
        let name = BoundedText::required("nome", name, MAX_TEXT_LENGTH)?;
        let country_of_origin =
            BoundedText::required("paisDeOrigem", country_of_origin, MAX_TEXT_LENGTH)?;
        if let Some(date) = founded_on {
            if date > Utc::now().date_naive() {
                return Err("dataDeFundacao must not be in the future".to_owned());
            }
        }
        Ok(Self {
            name,
            founded_on,
            country_of_origin,
        })
    }
}

impl Resource for Studio {
    type Draft = NewStudio;

    const SORT_FIELDS: &'static [&'static str] = &["id", "nome", "dataDeFundacao", "paisDeOrigem"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewStudio) -> Self {
        Self {
            id,
            name: draft.name.inner(),
            founded_on: draft.founded_on,
            country_of_origin: draft.country_of_origin.inner(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        contains_lowercase(&self.name, needle) || contains_lowercase(&self.country_of_origin, needle)
    }

    fn compare_by(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "nome" => self.name.cmp(&other.name),
            "dataDeFundacao" => self.founded_on.cmp(&other.founded_on),
            "paisDeOrigem" => self.country_of_origin.cmp(&other.country_of_origin),
            _ => self.id.cmp(&other.id),
        }
    }
}

use std::cmp::Ordering;

mod text;
pub use text::BoundedText;

mod studio;
pub use studio::{NewStudio, Studio};

mod genre;
pub use genre::{Genre, NewGenre};

mod game;
pub use game::{Game, NewGame};

pub mod idempotency;

/// A catalog record that can be stored, searched and sorted by a repository.
pub trait Resource: Clone + Send + Sync + 'static {
    /// The validated payload a record is created or updated from.
    type Draft: Clone + Send + Sync + 'static;

    /// JSON field names accepted as a sort key.
    const SORT_FIELDS: &'static [&'static str];

    fn id(&self) -> i64;

    fn from_draft(id: i64, draft: Self::Draft) -> Self;

    /// Case-insensitive substring match over the searchable fields.
    /// `needle` is already lowercased.
    fn matches(&self, needle: &str) -> bool;

    /// Orders by one of [`Resource::SORT_FIELDS`]; unknown fields compare by id.
    fn compare_by(&self, other: &Self, field: &str) -> Ordering;
}

fn contains_lowercase(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

use unicode_segmentation::UnicodeSegmentation;

/// Free text with a bounded length, counted in grapheme clusters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedText(String);

impl BoundedText {
    /// Text that must contain something other than whitespace.
    pub fn required(field: &str, value: Option<&str>, max_length: usize) -> Result<Self, String> {
        let value = value.unwrap_or_default();
        if value.trim().is_empty() {
            return Err(format!("{field} must not be blank"));
        }
        Self::bounded(field, value, max_length)
    }

    /// Text that may be absent or empty.
    pub fn optional(
        field: &str,
        value: Option<&str>,
        max_length: usize,
    ) -> Result<Option<Self>, String> {
        value
            .map(|value| Self::bounded(field, value, max_length))
            .transpose()
    }

    fn bounded(field: &str, value: &str, max_length: usize) -> Result<Self, String> {
        if value.graphemes(true).count() > max_length {
            return Err(format!(
                "{field} must be at most {max_length} characters long"
            ));
        }
        Ok(Self(value.to_owned()))
    }

    pub fn inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for BoundedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

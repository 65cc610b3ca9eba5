//! Relevance vocabulary derived from a schema

use harvest_domain::Schema;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("static regex"));

/// Lower-cased, deduplicated tokens describing what a schema looks for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    words: BTreeSet<String>,
}

impl KeywordSet {
    /// Derive keywords from the schema's top-level fields
    ///
    /// Each field contributes its lower-cased name plus every word of its
    /// description.
    ///
    /// # Examples
    ///
    /// ```
    /// use harvest_domain::{Field, FieldType, Schema};
    /// use harvest_extractor::KeywordSet;
    ///
    /// let schema = Schema::builder("Product")
    ///     .field(Field::required("Title", FieldType::String).with_description("Product name"))
    ///     .build()
    ///     .unwrap();
    ///
    /// let keywords = KeywordSet::from_schema(&schema);
    /// assert!(keywords.contains("title"));
    /// assert!(keywords.contains("product"));
    /// assert_eq!(keywords.len(), 3);
    /// ```
    pub fn from_schema(schema: &Schema) -> Self {
        let mut words = BTreeSet::new();

        for field in schema.fields() {
            words.insert(field.name.to_lowercase());

            if let Some(description) = &field.description {
                let description = description.to_lowercase();
                words.extend(WORD.find_iter(&description).map(|m| m.as_str().to_string()));
            }
        }

        Self { words }
    }

    /// Whether `word` is in the set
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of distinct keywords
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Keywords in lexical order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(|w| w.into().to_lowercase()).collect(),
        }
    }
}

//! Tokenized multi-field substring search.
//!
//! # Responsibility
//! - Normalize free-text queries into lowercase tokens.
//! - Apply AND-across-tokens / OR-across-fields filtering.
//! - Collect `(field, start, length)` match spans for highlighting.
//!
//! # Invariants
//! - Blank queries produce no result set.
//! - Span offsets are character offsets into the original field value.
//! - Each (token, field) pair contributes at most one span: its first match.

use std::fmt::{Display, Formatter};

/// Named searchable field of an entity or list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchField {
    /// User name, submission title or list display label.
    Name,
    /// Transliterated user name.
    NameRus,
    City,
    Affiliation,
    Country,
    Id,
    /// Mailing list description.
    Details,
}

impl SearchField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::NameRus => "name_rus",
            Self::City => "city",
            Self::Affiliation => "affiliation",
            Self::Country => "country",
            Self::Id => "id",
            Self::Details => "details",
        }
    }
}

impl Display for SearchField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record that can be matched by [`search`].
pub trait Searchable {
    /// Stable key used to address the record in results.
    fn search_id(&self) -> &str;
    /// Present searchable fields, in the order match spans are recorded.
    fn search_fields(&self) -> Vec<(SearchField, &str)>;
}

/// One token occurrence inside one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub field: SearchField,
    /// Character offset of the first matched character.
    pub start: usize,
    /// Matched length in characters.
    pub length: usize,
}

impl MatchSpan {
    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Matched record plus every span accumulated across all tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit<'a, T> {
    pub item: &'a T,
    pub matches: Vec<MatchSpan>,
}

/// Splits a query into lowercase whitespace-separated tokens.
///
/// Returns an empty vector for blank queries.
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(fold_case).collect()
}

/// Searches `items` for every token of `query`.
///
/// Each token narrows the candidates left by the previous token, so a record
/// survives only if every token occurs in at least one of its fields.
/// Returns an empty vector for blank queries; callers render the unfiltered
/// collection in that case.
pub fn search<'a, T: Searchable>(query: &str, items: &'a [T]) -> Vec<SearchHit<'a, T>> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut candidates = items
        .iter()
        .map(|item| {
            let fields = item
                .search_fields()
                .into_iter()
                .map(|(field, value)| FoldedField::new(field, value))
                .collect::<Vec<_>>();
            (
                SearchHit {
                    item,
                    matches: Vec::new(),
                },
                fields,
            )
        })
        .collect::<Vec<_>>();

    for token in &tokens {
        candidates.retain_mut(|(hit, fields)| {
            let found = fields
                .iter()
                .filter_map(|field| field.find(token))
                .collect::<Vec<_>>();
            if found.is_empty() {
                return false;
            }
            hit.matches.extend(found);
            true
        });
        if candidates.is_empty() {
            break;
        }
    }

    candidates.into_iter().map(|(hit, _)| hit).collect()
}

fn fold_case(value: &str) -> String {
    value.chars().flat_map(char::to_lowercase).collect()
}

/// Lowercased field value with a map back to original character offsets.
///
/// Lowercasing can expand one character into several, so offsets found in
/// the folded text are translated through `origin` before being reported.
struct FoldedField {
    field: SearchField,
    folded: String,
    origin: Vec<usize>,
}

impl FoldedField {
    fn new(field: SearchField, value: &str) -> Self {
        let mut folded = String::with_capacity(value.len());
        let mut origin = Vec::with_capacity(value.len());
        for (index, ch) in value.chars().enumerate() {
            for lower in ch.to_lowercase() {
                folded.push(lower);
                origin.push(index);
            }
        }
        Self {
            field,
            folded,
            origin,
        }
    }

    fn find(&self, token: &str) -> Option<MatchSpan> {
        let byte_offset = self.folded.find(token)?;
        let first = self.folded[..byte_offset].chars().count();
        let token_chars = token.chars().count();
        if token_chars == 0 {
            return None;
        }
        let start = self.origin[first];
        let end = self.origin[first + token_chars - 1] + 1;
        Some(MatchSpan {
            field: self.field,
            start,
            length: end - start,
        })
    }
}

//! Expression matching for word list searches.

use crate::model::{MatchMode, SearchFieldSelection, SearchMode, SearchParameter};

use super::WordRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Exact,
    Prefix,
    Suffix,
    Any,
    Near(u32),
}

/// Compiled search request, applied to one record at a time.
#[derive(Debug, Clone)]
pub struct Matcher {
    pattern: Pattern,
    expression: String,
    fields: SearchFieldSelection,
    match_mode: MatchMode,
}

impl Matcher {
    /// Build a matcher from a mode and its positional parameters.
    pub fn new(mode: &SearchMode, parameters: &[SearchParameter]) -> Result<Self, String> {
        let expression = parameters
            .iter()
            .find_map(SearchParameter::as_expression)
            .ok_or_else(|| format!("mode '{}' needs an expression", mode.id()))?;
        let fields = parameters
            .iter()
            .find_map(SearchParameter::as_search_fields)
            .copied()
            .unwrap_or_else(SearchFieldSelection::all);

        let pattern = match mode.id() {
            "exact" => Pattern::Exact,
            "prefix" => Pattern::Prefix,
            "suffix" => Pattern::Suffix,
            "any" => Pattern::Any,
            "near" => Pattern::Near(
                parameters
                    .iter()
                    .find_map(SearchParameter::as_distance)
                    .ok_or_else(|| "mode 'near' needs a distance".to_string())?,
            ),
            other => return Err(format!("unsupported search mode '{other}'")),
        };

        Ok(Self {
            pattern,
            expression: expression.trim().to_lowercase(),
            fields,
            match_mode: fields.match_mode().unwrap_or(MatchMode::Field),
        })
    }

    pub fn matches(&self, record: &WordRecord) -> bool {
        if self.expression.is_empty() {
            return false;
        }
        if self.fields.word && self.matches_field(&record.word) {
            return true;
        }
        if self.fields.reading {
            if let Some(reading) = &record.reading {
                if self.matches_field(reading) {
                    return true;
                }
            }
        }
        self.fields.translation && record.translations.iter().any(|t| self.matches_field(t))
    }

    fn matches_field(&self, field: &str) -> bool {
        let field = field.to_lowercase();
        match self.match_mode {
            MatchMode::Field => self.matches_text(&field),
            MatchMode::Word => split_words(&field).any(|w| self.matches_text(w)),
        }
    }

    fn matches_text(&self, text: &str) -> bool {
        let expression = self.expression.as_str();
        match self.pattern {
            Pattern::Exact => text == expression,
            Pattern::Prefix => text.starts_with(expression),
            Pattern::Suffix => text.ends_with(expression),
            Pattern::Any => text.contains(expression),
            Pattern::Near(distance) => edit_distance(text, expression) <= distance as usize,
        }
    }
}

/// Words of a field: runs of alphanumeric characters.
fn split_words(field: &str) -> impl Iterator<Item = &str> {
    field
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// Levenshtein distance over characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> WordRecord {
        WordRecord {
            word: "見る".into(),
            reading: Some("みる".into()),
            translations: vec!["to see".into(), "to look at".into()],
        }
    }

    fn matcher(mode: SearchMode, expression: &str, fields: SearchFieldSelection) -> Matcher {
        Matcher::new(
            &mode,
            &[
                SearchParameter::Expression(expression.into()),
                SearchParameter::SearchFields(fields),
                SearchParameter::Distance(1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("みる", "みた"), 1);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn test_word_match_mode() {
        let words = SearchFieldSelection::new(false, false, true, MatchMode::Word);
        let whole = SearchFieldSelection::new(false, false, true, MatchMode::Field);
        assert!(matcher(SearchMode::exact(), "look", words).matches(&record()));
        assert!(!matcher(SearchMode::exact(), "look", whole).matches(&record()));
        assert!(matcher(SearchMode::exact(), "To See", whole).matches(&record()));
    }

    #[test]
    fn test_field_selection_limits_match() {
        let reading_only = SearchFieldSelection::new(false, true, false, MatchMode::Field);
        assert!(matcher(SearchMode::prefix(), "み", reading_only).matches(&record()));
        assert!(!matcher(SearchMode::prefix(), "見", reading_only).matches(&record()));
    }

    #[test]
    fn test_empty_expression_matches_nothing() {
        assert!(!matcher(SearchMode::any(), "  ", SearchFieldSelection::all()).matches(&record()));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let mode = SearchMode::new("regex", "Regex", vec![]);
        assert!(Matcher::new(&mode, &[SearchParameter::Expression("x".into())]).is_err());
    }
}

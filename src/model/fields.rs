//! Search field and match mode selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A searchable field of a dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Word,
    Reading,
    Translation,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [Self::Word, Self::Reading, Self::Translation];

    /// Parse a field name as typed on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "word" | "w" => Some(Self::Word),
            "reading" | "r" => Some(Self::Reading),
            "translation" | "t" => Some(Self::Translation),
            _ => None,
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Word => "word",
            Self::Reading => "reading",
            Self::Translation => "translation",
        })
    }
}

/// How the expression is matched against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The expression is matched against the whole field.
    Field,
    /// The expression is matched against single words of the field.
    Word,
}

impl MatchMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "field" => Some(Self::Field),
            "word" => Some(Self::Word),
            _ => None,
        }
    }

    /// The other match mode.
    pub fn opposite(self) -> Self {
        match self {
            Self::Field => Self::Word,
            Self::Word => Self::Field,
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Field => "field",
            Self::Word => "word",
        })
    }
}

/// Selection state of the three search fields and the two match modes.
///
/// Used both as the user's selection and as the set of fields a
/// dictionary supports for a search mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchFieldSelection {
    pub word: bool,
    pub reading: bool,
    pub translation: bool,
    pub match_field: bool,
    pub match_word: bool,
}

impl SearchFieldSelection {
    /// Nothing selected.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every field and both match modes.
    pub fn all() -> Self {
        Self {
            word: true,
            reading: true,
            translation: true,
            match_field: true,
            match_word: true,
        }
    }

    pub fn new(word: bool, reading: bool, translation: bool, match_mode: MatchMode) -> Self {
        Self {
            word,
            reading,
            translation,
            match_field: match_mode == MatchMode::Field,
            match_word: match_mode == MatchMode::Word,
        }
    }

    pub fn is_selected(&self, field: SearchField) -> bool {
        match field {
            SearchField::Word => self.word,
            SearchField::Reading => self.reading,
            SearchField::Translation => self.translation,
        }
    }

    pub fn select(&mut self, field: SearchField, selected: bool) {
        match field {
            SearchField::Word => self.word = selected,
            SearchField::Reading => self.reading = selected,
            SearchField::Translation => self.translation = selected,
        }
    }

    pub fn is_match_mode_selected(&self, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Field => self.match_field,
            MatchMode::Word => self.match_word,
        }
    }

    pub fn select_match_mode(&mut self, mode: MatchMode, selected: bool) {
        match mode {
            MatchMode::Field => self.match_field = selected,
            MatchMode::Word => self.match_word = selected,
        }
    }

    /// The selected match mode, if exactly one is selected.
    pub fn match_mode(&self) -> Option<MatchMode> {
        match (self.match_field, self.match_word) {
            (true, false) => Some(MatchMode::Field),
            (false, true) => Some(MatchMode::Word),
            _ => None,
        }
    }

    /// Selected fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = SearchField> + '_ {
        SearchField::ALL
            .into_iter()
            .filter(move |f| self.is_selected(*f))
    }

    /// Usable as a search parameter: at least one field and exactly one match mode.
    pub fn is_valid(&self) -> bool {
        (self.word || self.reading || self.translation) && (self.match_field ^ self.match_word)
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            word: self.word | other.word,
            reading: self.reading | other.reading,
            translation: self.translation | other.translation,
            match_field: self.match_field | other.match_field,
            match_word: self.match_word | other.match_word,
        }
    }

    pub fn intersection(self, other: Self) -> Self {
        Self {
            word: self.word & other.word,
            reading: self.reading & other.reading,
            translation: self.translation & other.translation,
            match_field: self.match_field & other.match_field,
            match_word: self.match_word & other.match_word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_requires_field_and_single_match_mode() {
        assert!(SearchFieldSelection::new(true, false, false, MatchMode::Field).is_valid());
        assert!(!SearchFieldSelection::new(false, false, false, MatchMode::Word).is_valid());
        assert!(!SearchFieldSelection::all().is_valid());
        assert!(!SearchFieldSelection::none().is_valid());
    }

    #[test]
    fn test_union_and_intersection() {
        let a = SearchFieldSelection::new(true, false, false, MatchMode::Field);
        let b = SearchFieldSelection::new(false, true, false, MatchMode::Word);
        let u = a.union(b);
        assert!(u.word && u.reading && !u.translation);
        assert!(u.match_field && u.match_word);
        assert_eq!(a.intersection(b), SearchFieldSelection::none());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(SearchField::from_name("Reading"), Some(SearchField::Reading));
        assert_eq!(SearchField::from_name("t"), Some(SearchField::Translation));
        assert_eq!(SearchField::from_name("gloss"), None);
        assert_eq!(MatchMode::from_name("word"), Some(MatchMode::Word));
        assert_eq!(MatchMode::Word.opposite(), MatchMode::Field);
    }

    #[test]
    fn test_selected_fields_in_order() {
        let sel = SearchFieldSelection::new(true, false, true, MatchMode::Field);
        let fields: Vec<_> = sel.fields().collect();
        assert_eq!(fields, vec![SearchField::Word, SearchField::Translation]);
    }
}

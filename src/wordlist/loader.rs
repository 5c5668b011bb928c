//! Reading word list files.

use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, info};

use crate::error::{LookupError, Result};

use super::{WordList, WordRecord};

const MAX_COLUMNS: usize = 3;

/// Load a word list from disk.
///
/// `encoding` is a WHATWG label such as `"utf-8"`, `"euc-jp"` or
/// `"shift_jis"`. Without a label, a byte order mark is honored and UTF-8 is
/// assumed otherwise. The dictionary is named after the file stem.
pub fn load_word_list(path: impl AsRef<Path>, encoding: Option<&str>) -> Result<WordList> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| LookupError::io(path, e))?;
    let text = decode(&bytes, encoding)?;
    let records = parse_lines(&text).map_err(|(line, reason)| LookupError::InvalidWordList {
        path: path.to_path_buf(),
        line,
        reason,
    })?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    info!(path = %path.display(), entries = records.len(), "Loaded word list");
    Ok(WordList::new(name, records).with_path(path))
}

/// Parse word list text that is already in memory.
pub fn parse_word_list(text: &str) -> Result<Vec<WordRecord>> {
    parse_lines(text).map_err(|(line, reason)| LookupError::InvalidWordList {
        path: PathBuf::from("<memory>"),
        line,
        reason,
    })
}

fn decode(bytes: &[u8], label: Option<&str>) -> Result<String> {
    let encoding = match label {
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| LookupError::UnsupportedEncoding(label.to_string()))?,
        None => Encoding::for_bom(bytes).map_or(UTF_8, |(encoding, _)| encoding),
    };
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(encoding = used.name(), "Malformed sequences replaced while decoding");
    }
    Ok(text.into_owned())
}

/// Parse lines; errors carry the 1-based line number.
fn parse_lines(text: &str) -> std::result::Result<Vec<WordRecord>, (usize, String)> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() > MAX_COLUMNS {
            return Err((
                index + 1,
                format!("expected at most {MAX_COLUMNS} columns, found {}", columns.len()),
            ));
        }

        let word = columns[0].trim();
        if word.is_empty() {
            return Err((index + 1, "missing headword".to_string()));
        }
        let reading = columns
            .get(1)
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let translations: Vec<String> = columns
            .get(2)
            .map(|t| {
                t.split('/')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        records.push(WordRecord {
            word: word.to_string(),
            reading,
            translations,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_columns() {
        let records = parse_word_list("# animals\n猫\tねこ\tcat / puss\n\nfish\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].reading.as_deref(), Some("ねこ"));
        assert_eq!(records[0].translations, vec!["cat", "puss"]);
        assert_eq!(records[1].word, "fish");
        assert!(records[1].reading.is_none());
        assert!(records[1].translations.is_empty());
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = parse_word_list("ok\n\tnone\n").unwrap_err();
        assert!(matches!(err, LookupError::InvalidWordList { line: 2, .. }));

        let err = parse_word_list("a\tb\tc\td\n").unwrap_err();
        assert!(matches!(err, LookupError::InvalidWordList { line: 1, .. }));
    }

    #[test]
    fn test_load_with_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edict.tsv");
        let (bytes, _, _) = encoding_rs::EUC_JP.encode("猫\tねこ\tcat\n");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&bytes)
            .unwrap();

        let list = load_word_list(&path, Some("euc-jp")).unwrap();

        assert_eq!(list.records()[0].word, "猫");
        assert_eq!(list.path(), Some(path.as_path()));
        assert_eq!(crate::model::Dictionary::name(&list), "edict");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.tsv");
        assert!(matches!(
            load_word_list(&missing, None),
            Err(LookupError::Io { .. })
        ));

        let path = dir.path().join("words.tsv");
        std::fs::write(&path, "word\n").unwrap();
        assert!(matches!(
            load_word_list(&path, Some("klingon")),
            Err(LookupError::UnsupportedEncoding(_))
        ));
    }
}

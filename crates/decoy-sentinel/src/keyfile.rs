//! Parsing of sentinel key files.
//!
//! A key file has one key per line, formatted as `index key`. Tokens are
//! separated by ASCII whitespace, the index is an opaque label and the key
//! bytes are used verbatim as HMAC key. Anything after the key is ignored.
//! Key files need not be valid UTF-8.

use std::{fs, path::Path, str::FromStr};

use log::debug;

use crate::error::{Error, LineError, Result};

/// One line of a key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    /// Opaque index from the first column, lossily decoded for display.
    pub index: String,
    /// Secret key from the second column, as raw bytes.
    pub key: Vec<u8>,
    /// Line number in the key file, starting at 1.
    pub line: usize,
}

// space, \t, \n, \x0b, \x0c and \r; `u8::is_ascii_whitespace` skips \x0b
fn is_separator(b: &u8) -> bool {
    b.is_ascii_whitespace() || *b == 0x0b
}

/// Parse a single key-file line. `line` is 1-based and only used for errors.
pub fn parse_line(line: usize, text: &[u8]) -> Result<KeyEntry> {
    let mut tokens = text.split(is_separator).filter(|t| !t.is_empty());
    let Some(index) = tokens.next() else {
        return Err(Error::Parse {
            line,
            kind: LineError::Blank,
        });
    };
    let Some(key) = tokens.next() else {
        return Err(Error::Parse {
            line,
            kind: LineError::MissingKey,
        });
    };
    Ok(KeyEntry {
        index: String::from_utf8_lossy(index).into_owned(),
        key: key.to_vec(),
        line,
    })
}

/// All keys of a key file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFile {
    entries: Vec<KeyEntry>,
}

impl KeyFile {
    /// Read and parse a key file. Fails on the first malformed line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|source| Error::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        let keys = KeyFile::from_bytes(&contents)?;
        debug!("loaded {} keys from {}", keys.len(), path.display());
        Ok(keys)
    }

    /// Parse key-file contents. Lines end in `\n` or `\r\n`, and a final
    /// newline is optional.
    pub fn from_bytes(contents: &[u8]) -> Result<Self> {
        if contents.is_empty() {
            return Ok(KeyFile::default());
        }
        let body = contents.strip_suffix(b"\n").unwrap_or(contents);
        let entries = body
            .split(|&b| b == b'\n')
            .enumerate()
            .map(|(i, text)| parse_line(i + 1, text.strip_suffix(b"\r").unwrap_or(text)))
            .collect::<Result<Vec<_>>>()?;
        Ok(KeyFile { entries })
    }

    pub fn entries(&self) -> &[KeyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for KeyFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KeyFile::from_bytes(s.as_bytes())
    }
}

impl FromIterator<KeyEntry> for KeyFile {
    fn from_iter<I: IntoIterator<Item = KeyEntry>>(iter: I) -> Self {
        KeyFile {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_keys() {
        let kf: KeyFile = "0 testkey1\n1 testkey2\n".parse().unwrap();
        assert_eq!(kf.len(), 2);
        assert_eq!(kf.entries()[0].index, "0");
        assert_eq!(kf.entries()[0].key, b"testkey1");
        assert_eq!(kf.entries()[0].line, 1);
        assert_eq!(kf.entries()[1].index, "1");
        assert_eq!(kf.entries()[1].key, b"testkey2");
        assert_eq!(kf.entries()[1].line, 2);
    }

    #[test]
    fn whitespace_and_trailing_text() {
        let kf: KeyFile = "  7\tkey-a   trailing junk\r\nabc key-b\n".parse().unwrap();
        assert_eq!(kf.entries()[0].index, "7");
        assert_eq!(kf.entries()[0].key, b"key-a");
        assert_eq!(kf.entries()[1].index, "abc");
        assert_eq!(kf.entries()[1].key, b"key-b");
    }

    #[test]
    fn no_trailing_newline() {
        let kf: KeyFile = "0 k".parse().unwrap();
        assert_eq!(kf.len(), 1);
        let kf: KeyFile = "".parse().unwrap();
        assert!(kf.is_empty());
    }

    #[test]
    fn blank_line_is_rejected() {
        let err = "0 a\n\n1 b\n".parse::<KeyFile>().unwrap_err();
        match err {
            Error::Parse { line, kind } => {
                assert_eq!(line, 2);
                assert_eq!(kind, LineError::Blank);
            }
            e => panic!("unexpected error {e}"),
        }

        let err = "0 a\n   \t\n".parse::<KeyFile>().unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                line: 2,
                kind: LineError::Blank
            }
        ));
    }

    #[test]
    fn single_token_is_rejected() {
        let err = "0 a\n1 b\n2\n".parse::<KeyFile>().unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                line: 3,
                kind: LineError::MissingKey
            }
        ));
        assert_eq!(err.to_string(), "key file line 3: missing key, expected 'index key'");
    }

    #[test]
    fn missing_file() {
        let err = KeyFile::from_file("/nonexistent/keys.txt").unwrap_err();
        match err {
            Error::KeyFile { path, source } => {
                assert_eq!(path, Path::new("/nonexistent/keys.txt"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            e => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys");
        fs::write(&path, "0 testkey1\n1 testkey2\n").unwrap();
        let kf = KeyFile::from_file(&path).unwrap();
        assert_eq!(kf, "0 testkey1\n1 testkey2".parse::<KeyFile>().unwrap());
    }

    #[test]
    fn collect_entries() {
        let kf: KeyFile = vec![parse_line(1, b"a b").unwrap()].into_iter().collect();
        assert_eq!(kf.len(), 1);
    }

    #[test]
    fn key_keeps_unicode_whitespace() {
        let kf: KeyFile = "0 ab\u{a0}cd\n1 x\u{2003}y z\n".parse().unwrap();
        assert_eq!(kf.entries()[0].key, "ab\u{a0}cd".as_bytes());
        assert_eq!(kf.entries()[1].key, "x\u{2003}y".as_bytes());
    }

    #[test]
    fn key_need_not_be_utf8() {
        let kf = KeyFile::from_bytes(b"0 \xff\xfekey\n\xc3 k2\n").unwrap();
        assert_eq!(kf.len(), 2);
        assert_eq!(kf.entries()[0].key, b"\xff\xfekey");
        assert_eq!(kf.entries()[1].index, "\u{fffd}");
        assert_eq!(kf.entries()[1].key, b"k2");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys");
        fs::write(&path, b"0 \xff\xfekey\n").unwrap();
        let kf = KeyFile::from_file(&path).unwrap();
        assert_eq!(kf.entries()[0].key, b"\xff\xfekey");
    }

    #[test]
    fn ascii_separators() {
        let kf = KeyFile::from_bytes(b"0\x0bk1\x0ctrailing\r\n").unwrap();
        assert_eq!(kf.entries()[0].index, "0");
        assert_eq!(kf.entries()[0].key, b"k1");

        let err = KeyFile::from_bytes(b"0 a\n\x0b\x0c\r\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                line: 2,
                kind: LineError::Blank
            }
        ));
        let err = KeyFile::from_bytes(b"\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }
}

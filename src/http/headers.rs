use std::collections::HashMap;
use std::collections::hash_map;

use crate::http::parser::ParseError;

pub(crate) const CRLF: &[u8] = b"\r\n";

/// Case-insensitive header collection.
///
/// Lookups go through the lowercased name. The spelling a name was first
/// inserted with is kept for writing it back out. Setting a name that is
/// already present appends the new value to the old one separated by
/// `", "`, which is how repeated header fields are combined on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: String,
    value: String,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses at most one header line from the front of `data`.
    ///
    /// Returns the number of bytes consumed and whether the blank line that
    /// terminates the header section was reached. `Ok((0, false))` means the
    /// window holds no complete line yet.
    ///
    /// Value bytes that are not UTF-8 (obs-text) are kept as replacement
    /// characters rather than rejected.
    ///
    /// # Example
    ///
    /// ```
    /// # use rawhttp::http::headers::Headers;
    /// let mut headers = Headers::new();
    /// let (n, done) = headers.parse(b"Host: localhost:42069\r\n\r\n").unwrap();
    /// assert_eq!((n, done), (23, false));
    /// assert_eq!(headers.get("HOST"), Some("localhost:42069"));
    /// ```
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(idx) = find_crlf(data) else {
            return Ok((0, false));
        };

        if idx == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = &data[..idx];
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or_else(|| ParseError::MalformedHeaderLine(lossy(line)))?;

        let (name, value) = (&line[..colon], &line[colon + 1..]);
        validate_name(name)?;

        // validate_name only lets ASCII through
        let name = std::str::from_utf8(name).unwrap_or_default();
        self.set(name, &String::from_utf8_lossy(value));

        Ok((idx + CRLF.len(), false))
    }

    /// Inserts a header, merging with an existing value of the same name.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.trim();
        let value = value.trim();

        match self.entries.entry(name.to_ascii_lowercase()) {
            hash_map::Entry::Occupied(mut entry) => {
                let merged = &mut entry.get_mut().value;
                merged.push_str(", ");
                merged.push_str(value);
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(Field {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    /// Inserts a header, discarding any previous value of the same name.
    pub fn replace(&mut self, name: &str, value: impl Into<String>) {
        let name = name.trim();
        self.entries.insert(
            name.to_ascii_lowercase(),
            Field {
                name: name.to_string(),
                value: value.into(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|f| f.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .remove(&name.to_ascii_lowercase())
            .map(|f| f.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs, names spelled as inserted.
    /// Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|f| (f.name.as_str(), f.value.as_str()))
    }
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Token characters plus space. Space is accepted anywhere except directly
/// before the colon, so `" Host: x"` parses while `"Host : x"` does not.
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~ ".contains(&b)
}

fn validate_name(name: &[u8]) -> Result<(), ParseError> {
    let valid = !name.is_empty()
        && !name.ends_with(b" ")
        && name.iter().copied().all(is_name_byte);

    if valid {
        Ok(())
    } else {
        Err(ParseError::InvalidHeaderName(lossy(name)))
    }
}

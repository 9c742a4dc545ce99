//! Ad-hoc tokenizer for flat, JSON-shaped response bodies.
//!
//! The token endpoint answers with a single-level object of quoted
//! string values, e.g. `{"access_token":"abc","token_type":"bearer"}`.
//! This module extracts key/value pairs from that shape with a two-state
//! character scanner instead of pulling in a full JSON parse of the body.
//!
//! # Limitations
//!
//! This is deliberately *not* a JSON parser. Nested objects, arrays,
//! escaped quotes, and whitespace between pairs are not understood and
//! will produce garbled pairs. That is acceptable here: the only caller
//! is token acquisition, and the token endpoint response is always flat.

/// Scanner state: either inside a key or inside a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Key,
    Value,
}

/// Ordered key/value pairs extracted from a flat JSON-shaped body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct KeyValuePairs(Vec<(String, String)>);

impl KeyValuePairs {
    /// Returns the value of the *last* pair whose key matches, or `""`.
    ///
    /// Scanning forward and overwriting on each match means duplicate
    /// keys resolve to the final occurrence.
    pub(crate) fn lookup(&self, key: &str) -> &str {
        let mut found = "";
        for (candidate, value) in &self.0 {
            if candidate == key {
                found = value;
            }
        }
        found
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Scans `body` character by character, starting in key mode.
///
/// - key mode: `:` switches to value mode; `"`, `{` and `}` are dropped;
///   anything else appends to the current key.
/// - value mode: `,` finishes the pair and switches back to key mode;
///   `"`, `{` and `}` are dropped; anything else appends to the value.
///
/// The trailing pair has no comma to finish it, so it is always pushed
/// once the scan ends. An empty input therefore yields one empty pair.
pub(crate) fn tokenize(body: &str) -> KeyValuePairs {
    let mut pairs = Vec::new();
    let mut key = String::new();
    let mut value = String::new();
    let mut mode = Mode::Key;

    for ch in body.chars() {
        match mode {
            Mode::Key => match ch {
                ':' => mode = Mode::Value,
                '"' | '{' | '}' => {}
                _ => key.push(ch),
            },
            Mode::Value => match ch {
                ',' => {
                    pairs.push((std::mem::take(&mut key), std::mem::take(&mut value)));
                    mode = Mode::Key;
                }
                '"' | '{' | '}' => {}
                _ => value.push(ch),
            },
        }
    }
    pairs.push((key, value));

    KeyValuePairs(pairs)
}

//! Character-by-character reveal frames.
//!
//! Each frame appends the next `char` to an accumulator and yields the
//! accumulator with trailing whitespace trimmed. A text of N chars yields
//! exactly N frames.

/// Iterator over the progressive frames of a known final text
#[derive(Debug, Clone)]
pub struct Reveal {
    chars: Vec<char>,
    cursor: usize,
    shown: String,
}

impl Reveal {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            cursor: 0,
            shown: String::with_capacity(text.len()),
        }
    }

    /// Number of chars revealed so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.chars.len()
    }
}

impl Iterator for Reveal {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let c = *self.chars.get(self.cursor)?;
        self.shown.push(c);
        self.cursor += 1;
        Some(self.shown.trim_end().to_string())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chars.len() - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Reveal {}

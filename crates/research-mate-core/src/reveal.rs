//! Incremental reveal of answer text.
//!
//! [`Reveal`] is a lazy, finite, restartable sequence of increments over a
//! text: each item is the next character, as a sub-slice of the original.
//! Concatenating every item reproduces the text exactly. The consumer decides
//! the pacing; stopping early is just not pulling the next item.

/// Character-by-character increments of a text.
#[derive(Debug, Clone)]
pub struct Reveal<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Reveal<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    /// Portion of the text already yielded.
    pub fn revealed(&self) -> &'a str {
        &self.text[..self.offset]
    }

    /// Portion of the text not yet yielded.
    pub fn remaining(&self) -> &'a str {
        &self.text[self.offset..]
    }

    pub fn is_finished(&self) -> bool {
        self.offset >= self.text.len()
    }

    /// Start over from the first character.
    pub fn restart(&mut self) {
        self.offset = 0;
    }
}

impl<'a> Iterator for Reveal<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let ch = self.remaining().chars().next()?;
        let start = self.offset;
        self.offset += ch.len_utf8();
        Some(&self.text[start..self.offset])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.remaining();
        (rest.len().div_ceil(4), Some(rest.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenation_reproduces_text() {
        let text = "X is Y.";
        let joined: String = Reveal::new(text).collect();
        assert_eq!(joined, text);
        assert_eq!(Reveal::new(text).count(), 7);
    }

    #[test]
    fn test_multibyte_characters_are_single_units() {
        let text = "🤖 é";
        let units: Vec<&str> = Reveal::new(text).collect();
        assert_eq!(units, vec!["🤖", " ", "é"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let mut reveal = Reveal::new("");
        assert!(reveal.is_finished());
        assert_eq!(reveal.next(), None);
    }

    #[test]
    fn test_progress_and_restart() {
        let mut reveal = Reveal::new("abc");
        reveal.next();
        reveal.next();
        assert_eq!(reveal.revealed(), "ab");
        assert_eq!(reveal.remaining(), "c");

        reveal.restart();
        assert_eq!(reveal.revealed(), "");
        assert_eq!(reveal.collect::<String>(), "abc");
    }
}

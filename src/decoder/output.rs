/// Separator token appended after every confirmed word.
pub const SEPARATOR: &str = " ";

/// Confirmed tokens plus the word currently being entered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBuffer {
    tokens: Vec<String>,
    word: String,
}

impl TextBuffer {
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn set_word(&mut self, word: String) {
        self.word = word;
    }

    pub fn clear_word(&mut self) {
        self.word.clear();
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Commits `word` (skipped when empty) followed by a separator.
    pub fn commit(&mut self, word: &str) {
        if !word.is_empty() {
            self.tokens.push(word.to_string());
        }
        self.tokens.push(SEPARATOR.to_string());
        self.word.clear();
    }

    pub fn pop_token(&mut self) -> Option<String> {
        self.tokens.pop()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
        self.word.clear();
    }

    pub fn render(&self) -> String {
        let mut out: String = self.tokens.concat();
        out.push_str(&self.word);
        out
    }
}

/// Frame counter for the text cursor; visible during the second half of each period.
#[derive(Debug, Clone)]
pub struct CursorBlink {
    period: u32,
    counter: u32,
}

impl CursorBlink {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(2),
            counter: 0,
        }
    }

    pub fn tick(&mut self) {
        self.counter = (self.counter + 1) % self.period;
    }

    pub fn visible(&self) -> bool {
        self.counter >= self.period / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_and_render() {
        let mut buf = TextBuffer::default();
        buf.set_word("hi".into());
        assert_eq!(buf.render(), "hi");
        let word = buf.word().to_string();
        buf.commit(&word);
        buf.commit("");
        assert_eq!(buf.tokens(), ["hi", " ", " "]);
        assert_eq!(buf.render(), "hi  ");
        assert_eq!(buf.pop_token().as_deref(), Some(" "));
    }

    #[test]
    fn test_cursor_phase() {
        let mut cursor = CursorBlink::new(4);
        let phases: Vec<bool> = (0..8)
            .map(|_| {
                cursor.tick();
                cursor.visible()
            })
            .collect();
        assert_eq!(phases, [false, true, true, false, false, true, true, false]);
    }
}

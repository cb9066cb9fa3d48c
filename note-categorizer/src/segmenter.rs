/// Characters that end a sentence fragment
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Splits dictation into sentence fragments on terminal punctuation.
///
/// Abbreviations such as "Dr." are split like any other period; the
/// confidence thresholds downstream are tuned against that behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceSegmenter {
    /// Fragments with this many characters or fewer are dropped
    min_fragment_chars: usize,
}

impl SentenceSegmenter {
    pub fn new(min_fragment_chars: usize) -> Self {
        Self { min_fragment_chars }
    }

    /// Trimmed fragments in source order
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split(&SENTENCE_TERMINATORS[..])
            .map(str::trim)
            .filter(|fragment| fragment.chars().count() > self.min_fragment_chars)
            .collect()
    }
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self::new(10)
    }
}

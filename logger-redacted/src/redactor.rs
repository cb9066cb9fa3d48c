use regex::Regex;
use lazy_static::lazy_static;
use sha2::{Sha256, Digest};
use base64::{Engine as _, engine::general_purpose};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    static ref SSN_REGEX: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"(?:\+1[-.\s]?)?\(?\b[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s][0-9]{4}\b").unwrap();
    static ref MRN_REGEX: Regex = Regex::new(r"(?i)\bMRN[:#\s-]*\d{4,}\b").unwrap();
    static ref DOB_REGEX: Regex = Regex::new(r"(?i)\b(?:dob|date of birth|born on)[:\s]*\d{1,4}[/-]\d{1,2}[/-]\d{1,4}\b").unwrap();
}

/// Default number of characters kept by [`PiiRedactor::excerpt`]
pub const DEFAULT_EXCERPT_CHARS: usize = 120;

/// Kind of protected identifier a pattern detects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhiKind {
    Email,
    Ssn,
    Phone,
    MedicalRecordNumber,
    DateOfBirth,
}

impl PhiKind {
    fn label(self) -> &'static str {
        match self {
            PhiKind::Email => "EMAIL",
            PhiKind::Ssn => "SSN",
            PhiKind::Phone => "PHONE",
            PhiKind::MedicalRecordNumber => "MRN",
            PhiKind::DateOfBirth => "DOB",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            PhiKind::Email => &EMAIL_REGEX,
            PhiKind::Ssn => &SSN_REGEX,
            PhiKind::Phone => &PHONE_REGEX,
            PhiKind::MedicalRecordNumber => &MRN_REGEX,
            PhiKind::DateOfBirth => &DOB_REGEX,
        }
    }
}

/// PHI redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub enabled: bool,
    /// Patterns applied in order; SSN runs before phone so it is not half-matched
    pub kinds: Vec<PhiKind>,
    /// Replace matches with a short hash so repeated values can be correlated
    pub hash_for_correlation: bool,
    pub excerpt_chars: usize,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kinds: vec![
                PhiKind::Email,
                PhiKind::Ssn,
                PhiKind::MedicalRecordNumber,
                PhiKind::DateOfBirth,
                PhiKind::Phone,
            ],
            hash_for_correlation: false,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

impl RedactionConfig {
    /// Configuration that leaves text untouched apart from excerpt truncation
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Scrubs identifiers out of clinical text before it reaches a log line
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        if !self.config.enabled {
            return text.to_string();
        }

        self.config.kinds.iter().fold(text.to_string(), |acc, kind| {
            kind.pattern()
                .replace_all(&acc, |caps: &regex::Captures| self.replacement(*kind, &caps[0]))
                .into_owned()
        })
    }

    /// Redacted, length-bounded preview suitable for a log field
    pub fn excerpt(&self, text: &str) -> String {
        let redacted = self.redact(text.trim());
        let limit = self.config.excerpt_chars;
        match redacted.char_indices().nth(limit) {
            Some((cut, _)) => format!("{}…", &redacted[..cut]),
            None => redacted,
        }
    }

    fn replacement(&self, kind: PhiKind, value: &str) -> String {
        if self.config.hash_for_correlation {
            format!("{}[{}]", kind.label(), hash_value(value))
        } else {
            format!("[{}]", kind.label())
        }
    }
}

fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    general_purpose::STANDARD.encode(&result[..8])
}

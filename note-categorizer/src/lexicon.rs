//! Clinical keyword knowledge base
//!
//! Maps each [`SectionType`] to the domain vocabulary that signals it. The
//! lexicon is a plain value handed to the scorer and template matcher, so a
//! deployment (or a test) can swap in its own vocabulary without touching any
//! shared state.

use std::collections::BTreeMap;

use crate::template::SectionType;

/// Section type to keyword mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    entries: BTreeMap<SectionType, Vec<String>>,
}

impl Lexicon {
    /// Lexicon with no keywords for any section type
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Build a lexicon from explicit entries. Keywords are lower-cased and
    /// de-duplicated.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (SectionType, Vec<K>)>,
        K: Into<String>,
    {
        entries
            .into_iter()
            .fold(Self::empty(), |lexicon, (section_type, keywords)| {
                lexicon.with_keywords(section_type, keywords)
            })
    }

    /// Replace the keyword set of one section type
    pub fn with_keywords<K: Into<String>>(mut self, section_type: SectionType, keywords: Vec<K>) -> Self {
        let mut normalized: Vec<String> = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let keyword = keyword.into().trim().to_lowercase();
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        self.entries.insert(section_type, normalized);
        self
    }

    pub fn keywords(&self, section_type: SectionType) -> &[String] {
        self.entries
            .get(&section_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any keyword of `section_type` occurs in already lower-cased text
    pub fn mentions(&self, section_type: SectionType, lower_text: &str) -> bool {
        self.keywords(section_type)
            .iter()
            .any(|keyword| lower_text.contains(keyword.as_str()))
    }

    /// Built-in clinical vocabulary
    pub fn clinical() -> Self {
        Self::from_entries([
            (
                SectionType::Symptoms,
                vec![
                    "pain", "ache", "headache", "nausea", "vomiting", "fever", "cough",
                    "fatigue", "dizziness", "dizzy", "shortness of breath", "chest pain",
                    "swelling", "rash", "itching", "numbness", "weakness", "chills",
                    "sore throat", "diarrhea", "constipation", "palpitations", "symptom",
                ],
            ),
            (
                SectionType::Vitals,
                vec![
                    "blood pressure", "bp", "heart rate", "pulse", "temperature",
                    "respiratory rate", "oxygen saturation", "spo2", "weight",
                    "height", "bmi", "vitals", "vital signs",
                ],
            ),
            (
                SectionType::Examination,
                vec![
                    "examination", "exam", "inspection", "palpation", "auscultation",
                    "percussion", "tenderness", "tender", "lungs", "heart sounds",
                    "abdomen", "reflexes", "range of motion", "lymph nodes", "murmur",
                    "clear to auscultation",
                ],
            ),
            (
                SectionType::Diagnosis,
                vec![
                    "diagnosis", "diagnosed", "assessment", "impression", "consistent with",
                    "suspected", "rule out", "differential", "infection", "hypertension",
                    "diabetes", "migraine", "pneumonia", "asthma", "fracture",
                ],
            ),
            (
                SectionType::Treatment,
                vec![
                    "medication", "prescribe", "prescribed", "dose", "tablet", "mg",
                    "injection", "antibiotic", "ibuprofen", "acetaminophen", "amoxicillin",
                    "therapy", "physical therapy", "administered", "twice daily",
                ],
            ),
            (
                SectionType::History,
                vec![
                    "history", "previous", "prior", "past medical", "family history",
                    "surgical history", "allergies", "allergic", "smoker", "smoking",
                    "alcohol", "chronic", "years ago",
                ],
            ),
            (
                SectionType::Plan,
                vec![
                    "follow-up", "follow up", "return", "schedule", "referral", "refer",
                    "next visit", "monitor", "recheck", "continue", "lab work", "imaging",
                    "in two weeks",
                ],
            ),
            (
                SectionType::Notes,
                vec![
                    "note", "additional", "comment", "discussed", "education", "counseled",
                    "patient understands", "questions answered",
                ],
            ),
        ])
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::clinical()
    }
}

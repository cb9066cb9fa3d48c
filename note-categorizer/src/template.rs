use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CategorizerError, CategorizerResult};

/// Clinical category collected by a note section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Symptoms,
    Vitals,
    Examination,
    Diagnosis,
    Treatment,
    History,
    Plan,
    Notes,
}

impl SectionType {
    pub const ALL: [SectionType; 8] = [
        SectionType::Symptoms,
        SectionType::Vitals,
        SectionType::Examination,
        SectionType::Diagnosis,
        SectionType::Treatment,
        SectionType::History,
        SectionType::Plan,
        SectionType::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Symptoms => "symptoms",
            SectionType::Vitals => "vitals",
            SectionType::Examination => "examination",
            SectionType::Diagnosis => "diagnosis",
            SectionType::Treatment => "treatment",
            SectionType::History => "history",
            SectionType::Plan => "plan",
            SectionType::Notes => "notes",
        }
    }

    /// ICD-10 codes are only attached to symptom and diagnosis content
    pub fn supports_icd10(&self) -> bool {
        matches!(self, SectionType::Symptoms | SectionType::Diagnosis)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed field of a clinical note template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSection {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    /// Extra trigger words on top of the lexicon entry for `section_type`
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl TemplateSection {
    pub fn new(id: impl Into<String>, title: impl Into<String>, section_type: SectionType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            section_type,
            placeholder: String::new(),
            required: false,
            keywords: Vec::new(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Ordered collection of sections defining a clinical note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub sections: Vec<TemplateSection>,
}

impl Template {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: TemplateSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn section(&self, section_id: &str) -> Option<&TemplateSection> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    /// Index of a section in template order
    pub fn position(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == section_id)
    }

    /// Structural checks applied at the LLM and CLI boundaries
    pub fn validate(&self) -> CategorizerResult<()> {
        if self.id.trim().is_empty() {
            return Err(CategorizerError::Validation("Template id cannot be empty".to_string()));
        }

        if self.sections.is_empty() {
            return Err(CategorizerError::Validation(format!(
                "Template '{}' has no sections",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.id.trim().is_empty() {
                return Err(CategorizerError::Validation(format!(
                    "Template '{}' contains a section without an id",
                    self.id
                )));
            }
            if !seen.insert(section.id.as_str()) {
                return Err(CategorizerError::Validation(format!(
                    "Template '{}' has duplicate section id '{}'",
                    self.id, section.id
                )));
            }
        }

        Ok(())
    }
}

/// Best section for a single fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub section_id: String,
    pub confidence: f64,
    pub suggested_content: String,
}

/// Fragments routed to one section, merged in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationGroup {
    pub section_id: String,
    pub confidence: f64,
    pub suggested_content: String,
}

impl From<ClassificationResult> for CategorizationGroup {
    fn from(result: ClassificationResult) -> Self {
        Self {
            section_id: result.section_id,
            confidence: result.confidence,
            suggested_content: result.suggested_content,
        }
    }
}

/// Template recommended for a whole transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSuggestion {
    pub template_id: String,
    pub confidence: f64,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icd10Code {
    pub code: String,
    pub description: String,
}

//! Clinical Note Categorizer for Healthcare EMR
//!
//! Routes fragments of transcribed clinical dictation into the fields of a
//! structured note template (symptoms, vitals, diagnosis, ...) and recommends
//! the template that best fits a whole transcription.
//!
//! # Categorization Paths
//!
//! **Rule-based (deterministic, offline):**
//! 1. [`SentenceSegmenter`] splits dictation on `.`, `!` and `?`
//! 2. [`SectionScorer`] scores each fragment against each section from
//!    keyword matches plus a per-type contextual trigger
//! 3. [`Categorizer`] keeps each fragment's best section above the
//!    confidence floor and merges fragments per section in source order
//! 4. [`TemplateMatcher`] scores whole templates by identity triggers and
//!    section coverage
//!
//! **LLM-assisted (optional, requires an API key):**
//! - [`llm::ChatCompletionCategorizer`] sends one chat-completion request
//!   and returns section content with ICD-10 codes for symptom and
//!   diagnosis sections
//!
//! [`CategorizationService`] applies the configured
//! [`CategorizationStrategy`]: by default the LLM result is preferred and the
//! rule-based result stands in whenever the LLM call fails.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use note_categorizer::{templates, CategorizationService, CategorizerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CategorizerConfig::from_env()?;
//! let service = CategorizationService::new(config)?;
//!
//! let transcription = "Patient complains of severe headache and nausea. BP 140/90, HR 88 bpm.";
//! let template = templates::general_consultation();
//!
//! let note = service.categorize(transcription, &template).await?;
//! for section in &note.sections {
//!     println!("{}: {}", section.section_id, section.content);
//! }
//!
//! if let Some(suggestion) = service.suggest_template(transcription, &templates::default_templates()) {
//!     println!("Suggested template: {}", suggestion.template_id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod llm;
pub mod scorer;
pub mod segmenter;
pub mod service;
pub mod template;
pub mod template_matcher;
pub mod templates;
pub mod usage;

pub use aggregator::*;
pub use config::*;
pub use error::*;
pub use lexicon::*;
pub use scorer::*;
pub use segmenter::*;
pub use service::*;
pub use template::*;
pub use template_matcher::*;
pub use usage::*;

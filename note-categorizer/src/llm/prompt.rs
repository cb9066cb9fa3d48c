use crate::template::Template;

/// Render the template sections the model may route content into
pub fn render_sections(template: &Template) -> String {
    template
        .sections
        .iter()
        .map(|section| {
            let mut line = format!(
                "- sectionId: \"{}\" | title: {} | type: {}",
                section.id, section.title, section.section_type
            );
            if !section.placeholder.trim().is_empty() {
                line.push_str(&format!(" | expects: {}", section.placeholder.trim()));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single user message asking for the categorization JSON contract.
///
/// The transcription is embedded verbatim between delimiters and is
/// instruction data only. `language` is the language section content and
/// the summary are written in.
pub fn build_categorization_prompt(transcription: &str, template: &Template, language: &str) -> String {
    format!(
        r#"You are a clinical documentation assistant. Categorize the medical transcription below into the sections of the "{name}" note template.

TEMPLATE SECTIONS:
{sections}

TRANSCRIPTION:
"""
{transcription}
"""

INSTRUCTIONS:
- Assign each relevant part of the transcription to exactly one section, using the sectionId values listed above.
- Keep clinical wording faithful to the transcription; do not invent findings.
- Give each categorization a confidence between 0 and 1.
- For symptoms and diagnosis sections only, include matching ICD-10 codes in "icd10Codes"; omit the field elsewhere.
- Write a one or two sentence clinical summary of the encounter.
- Write section content and the summary in this language: {language}.

Respond with ONLY valid JSON in exactly this shape, with no markdown and no commentary:
{{
  "categorizations": [
    {{
      "sectionId": "section id",
      "content": "text for this section",
      "confidence": 0.0,
      "icd10Codes": [{{ "code": "R51.9", "description": "Headache, unspecified" }}]
    }}
  ],
  "summary": "brief clinical summary"
}}"#,
        name = template.name,
        sections = render_sections(template),
        transcription = transcription,
        language = language.trim(),
    )
}

//! Built-in note templates
//!
//! The identifiers match the triggers in [`crate::template_matcher::default_triggers`].

use crate::template::{SectionType, Template, TemplateSection};

pub const GENERAL_CONSULTATION: &str = "general-consultation";
pub const EMERGENCY: &str = "emergency";
pub const FOLLOW_UP: &str = "follow-up";
pub const PHYSICAL_EXAM: &str = "physical-exam";
pub const PROCEDURE: &str = "procedure";

pub fn general_consultation() -> Template {
    Template::new(GENERAL_CONSULTATION, "General Consultation")
        .with_section(
            TemplateSection::new("chief-complaint", "Chief Complaint", SectionType::Symptoms)
                .with_placeholder("Presenting symptoms in the patient's words")
                .required(),
        )
        .with_section(
            TemplateSection::new("history", "History of Present Illness", SectionType::History)
                .with_placeholder("Onset, duration, relevant medical and family history"),
        )
        .with_section(
            TemplateSection::new("vitals", "Vital Signs", SectionType::Vitals)
                .with_placeholder("BP, HR, temperature, respiratory rate, SpO2"),
        )
        .with_section(
            TemplateSection::new("examination", "Physical Examination", SectionType::Examination)
                .with_placeholder("Findings by system"),
        )
        .with_section(
            TemplateSection::new("assessment", "Assessment", SectionType::Diagnosis)
                .with_placeholder("Working diagnosis and differentials")
                .required(),
        )
        .with_section(
            TemplateSection::new("treatment", "Treatment", SectionType::Treatment)
                .with_placeholder("Medications, dosages and procedures"),
        )
        .with_section(
            TemplateSection::new("plan", "Plan", SectionType::Plan)
                .with_placeholder("Follow-up, referrals and investigations")
                .required(),
        )
        .with_section(
            TemplateSection::new("notes", "Additional Notes", SectionType::Notes)
                .with_placeholder("Counselling and anything else worth recording"),
        )
}

pub fn emergency() -> Template {
    Template::new(EMERGENCY, "Emergency Visit")
        .with_section(
            TemplateSection::new("presentation", "Presentation", SectionType::Symptoms)
                .with_placeholder("Chief complaint and acuity")
                .with_keywords(["trauma", "collapse", "bleeding"])
                .required(),
        )
        .with_section(
            TemplateSection::new("triage-vitals", "Triage Vitals", SectionType::Vitals).required(),
        )
        .with_section(TemplateSection::new("primary-survey", "Primary Survey", SectionType::Examination))
        .with_section(
            TemplateSection::new("working-diagnosis", "Working Diagnosis", SectionType::Diagnosis).required(),
        )
        .with_section(TemplateSection::new("interventions", "Interventions", SectionType::Treatment))
        .with_section(
            TemplateSection::new("disposition", "Disposition", SectionType::Plan)
                .with_keywords(["admit", "discharge", "transfer"]),
        )
}

pub fn follow_up() -> Template {
    Template::new(FOLLOW_UP, "Follow-up Visit")
        .with_section(
            TemplateSection::new("interval-history", "Interval History", SectionType::History)
                .with_keywords(["since last visit", "improved", "worsened"]),
        )
        .with_section(TemplateSection::new("current-symptoms", "Current Symptoms", SectionType::Symptoms))
        .with_section(TemplateSection::new("vitals", "Vital Signs", SectionType::Vitals))
        .with_section(
            TemplateSection::new("progress", "Progress Assessment", SectionType::Diagnosis)
                .with_keywords(["stable", "resolved", "improving"]),
        )
        .with_section(TemplateSection::new("plan", "Plan", SectionType::Plan).required())
}

pub fn physical_exam() -> Template {
    Template::new(PHYSICAL_EXAM, "Physical Examination")
        .with_section(TemplateSection::new("vitals", "Vital Signs", SectionType::Vitals).required())
        .with_section(
            TemplateSection::new("general-appearance", "General Appearance", SectionType::Examination)
                .with_keywords(["alert", "oriented", "well-appearing", "distress"]),
        )
        .with_section(
            TemplateSection::new("systems", "Systems Review", SectionType::Examination)
                .with_keywords(["cardiovascular", "respiratory", "neurological", "musculoskeletal"]),
        )
        .with_section(TemplateSection::new("impression", "Impression", SectionType::Diagnosis))
        .with_section(TemplateSection::new("notes", "Notes", SectionType::Notes))
}

pub fn procedure() -> Template {
    Template::new(PROCEDURE, "Procedure Note")
        .with_section(
            TemplateSection::new("indication", "Indication", SectionType::Diagnosis).required(),
        )
        .with_section(
            TemplateSection::new("procedure-details", "Procedure Details", SectionType::Treatment)
                .with_keywords(["anesthesia", "incision", "sutured", "sterile"])
                .required(),
        )
        .with_section(
            TemplateSection::new("findings", "Findings", SectionType::Examination),
        )
        .with_section(
            TemplateSection::new("complications", "Complications", SectionType::Notes)
                .with_keywords(["complication", "blood loss", "tolerated"]),
        )
        .with_section(
            TemplateSection::new("post-procedure", "Post-procedure Plan", SectionType::Plan),
        )
}

/// All built-in templates, general consultation first
pub fn default_templates() -> Vec<Template> {
    vec![general_consultation(), emergency(), follow_up(), physical_exam(), procedure()]
}

pub fn find(template_id: &str) -> Option<Template> {
    default_templates().into_iter().find(|t| t.id == template_id)
}

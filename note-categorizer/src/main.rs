//! Clinical note categorizer CLI
//!
//! Usage:
//!   note-categorizer categorize --template general-consultation --input visit.txt
//!   note-categorizer suggest --templates-file templates.json < visit.txt
//!   note-categorizer ai-categorize --template follow-up --input visit.txt
//!
//! Transcriptions are read from `--input` or stdin; results are printed as
//! JSON on stdout and logs go to stderr.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use logger_redacted::LoggerConfig;
use note_categorizer::{templates, CategorizationService, CategorizerConfig, Template};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "note-categorizer")]
#[command(about = "Route clinical dictation into structured note templates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rule-based categorization into one template
    Categorize(TemplateArgs),
    /// Recommend the best-fitting template
    Suggest(SourceArgs),
    /// Categorize with the configured strategy (LLM with rule-based fallback by default)
    AiCategorize(TemplateArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Transcription file; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON file holding an array of templates; built-in templates when omitted
    #[arg(long)]
    templates_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TemplateArgs {
    /// Template identifier
    #[arg(long, default_value = templates::GENERAL_CONSULTATION)]
    template: String,

    #[command(flatten)]
    source: SourceArgs,
}

impl SourceArgs {
    fn read_transcription(&self) -> anyhow::Result<String> {
        match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read transcription from {}", path.display())),
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read transcription from stdin")?;
                Ok(text)
            }
        }
    }

    fn load_templates(&self) -> anyhow::Result<Vec<Template>> {
        let Some(path) = &self.templates_file else {
            return Ok(templates::default_templates());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read templates from {}", path.display()))?;
        let loaded: Vec<Template> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid template JSON in {}", path.display()))?;
        for template in &loaded {
            template.validate()?;
        }
        Ok(loaded)
    }
}

impl TemplateArgs {
    fn load_template(&self) -> anyhow::Result<Template> {
        self.source
            .load_templates()?
            .into_iter()
            .find(|t| t.id == self.template)
            .ok_or_else(|| anyhow!("Unknown template: {}", self.template))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logger_redacted::init(&LoggerConfig::from_env())?;

    let cli = Cli::parse();

    match cli.command {
        Command::Categorize(args) => {
            let template = args.load_template()?;
            let text = args.source.read_transcription()?;
            let service = CategorizationService::new(CategorizerConfig::rules_only())?;

            let groups = service.categorizer().categorize(&text, &template.sections);
            info!(template_id = %template.id, groups = groups.len(), "Categorized transcription");
            println!("{}", serde_json::to_string_pretty(&groups)?);
        }
        Command::Suggest(args) => {
            let candidates = args.load_templates()?;
            let text = args.read_transcription()?;
            let service = CategorizationService::new(CategorizerConfig::rules_only())?;

            let suggestion = service.suggest_template(&text, &candidates);
            println!("{}", serde_json::to_string_pretty(&suggestion)?);
        }
        Command::AiCategorize(args) => {
            let template = args.load_template()?;
            template.validate()?;
            let text = args.source.read_transcription()?;
            let service = CategorizationService::new(CategorizerConfig::from_env()?)?;

            let note = service.categorize(&text, &template).await?;
            info!(
                template_id = %template.id,
                source = ?note.source,
                sections = note.sections.len(),
                "Categorized transcription"
            );
            println!("{}", serde_json::to_string_pretty(&note)?);
        }
    }

    Ok(())
}

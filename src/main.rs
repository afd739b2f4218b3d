//! Quire - Command-line Entry Point
//!
//! Drives the workspace panels headlessly against the managed storage
//! directory: list, create and delete documents, import PDFs, instantiate
//! templates, and run an assistant response through the formula parser.

use log::{error, info};
use quire::ai::{AiAction, AiService, AssistantSession, ScriptedClient};
use quire::config::{get_data_dir, load_config, save_config_silent, Settings};
use quire::store::{DocumentStore, PdfLibrary, StorageLayout};
use quire::templates::{resolve, TemplateCatalog, VariableKind};
use quire::{Error, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

/// Application name constant.
const APP_NAME: &str = "Quire";

const USAGE: &str = "usage: quire <command> [args]

commands:
  list [query]                         documents, starred first
  new <title> [content]                create a document
  star <id>                            toggle a document's star
  delete <id>                          delete a document
  pdfs [query]                         imported PDFs
  import <file.pdf>                    copy a PDF into the library
  templates                            available templates
  instantiate <template> [title] [name=value ...]
  ask <generate|explain|fix|summarize|improve> <input> [context]
                                       split a response read from stdin";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let mut settings = load_config();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(&mut settings, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: &mut Settings, args: &[String]) -> Result<()> {
    let layout = StorageLayout::new(get_data_dir(settings)?);
    let command = args.first().map(String::as_str).unwrap_or("list");
    let rest = args.get(1..).unwrap_or_default();

    match command {
        "list" => {
            let docs = open_documents(&layout, settings);
            for doc in docs.view(&rest.join(" ")) {
                let star = if doc.is_starred { "*" } else { " " };
                println!(
                    "{} {}  {}  {}",
                    star,
                    doc.id,
                    doc.title,
                    doc.preview(48)
                );
            }
            Ok(())
        }
        "new" => {
            let title = rest.first().map(String::as_str).unwrap_or("");
            let content = rest.get(1).map(String::as_str).unwrap_or("");
            let mut docs = open_documents(&layout, settings);
            let id = docs.create_document(title, content)?;
            println!("{}", id);
            Ok(())
        }
        "star" | "delete" => {
            let id = parse_id(rest.first())?;
            let mut docs = open_documents(&layout, settings);
            let found = if command == "star" {
                docs.toggle_star(id)?
            } else {
                docs.delete(id)?
            };
            if !found {
                return Err(Error::Application(format!("No document with id {}", id)));
            }
            Ok(())
        }
        "pdfs" => {
            let mut library = PdfLibrary::open(layout.pdfs_dir());
            library.load();
            for pdf in library.view(&rest.join(" ")) {
                let star = if pdf.is_starred { "*" } else { " " };
                println!(
                    "{} {}  {}  ({} pages)",
                    star, pdf.id, pdf.title, pdf.page_count
                );
            }
            Ok(())
        }
        "import" => {
            let source = rest
                .first()
                .ok_or_else(|| Error::Application(USAGE.to_string()))?;
            let mut library = PdfLibrary::open(layout.pdfs_dir());
            library.load();
            let id = library.import(Path::new(source))?;
            println!("{}", id);
            Ok(())
        }
        "templates" => {
            let catalog = TemplateCatalog::load(&layout.templates_dir());
            for template in catalog.ordered_by_recent(&settings.recent_templates) {
                println!("{:<16} {:?}  {}", template.id, template.kind, template.name);
                for variable in &template.variables {
                    let choices = match variable.input_kind() {
                        VariableKind::Choice => format!(" [{}]", variable.offered_choices().join("|")),
                        _ => String::new(),
                    };
                    println!(
                        "    {} ({:?}){}",
                        variable.name,
                        variable.input_kind(),
                        choices
                    );
                }
            }
            Ok(())
        }
        "instantiate" => instantiate(&layout, settings, rest),
        "ask" => ask(settings, rest).await,
        _ => Err(Error::Application(USAGE.to_string())),
    }
}

fn open_documents(layout: &StorageLayout, settings: &Settings) -> DocumentStore {
    let mut docs = DocumentStore::open(layout.docs_dir())
        .with_seeding(settings.seed_welcome_document)
        .with_body_search(settings.search_document_content);
    docs.load();
    docs
}

fn parse_id(arg: Option<&String>) -> Result<Uuid> {
    let arg = arg.ok_or_else(|| Error::Application(USAGE.to_string()))?;
    Uuid::parse_str(arg).map_err(|e| Error::Application(format!("Invalid id '{}': {}", arg, e)))
}

fn instantiate(layout: &StorageLayout, settings: &mut Settings, rest: &[String]) -> Result<()> {
    let template_id = rest
        .first()
        .ok_or_else(|| Error::Application(USAGE.to_string()))?;
    let catalog = TemplateCatalog::load(&layout.templates_dir());
    let template = catalog
        .get(template_id)
        .ok_or_else(|| Error::Application(format!("Unknown template '{}'", template_id)))?;

    // Optional title, then name=value pairs
    let mut title = "";
    let mut raw_values = HashMap::new();
    for arg in rest.iter().skip(1) {
        match arg.split_once('=') {
            Some((name, value)) => {
                raw_values.insert(name.to_string(), value.to_string());
            }
            None if title.is_empty() => title = arg.as_str(),
            None => {}
        }
    }

    let fill = resolve(template, title, &raw_values);
    let mut docs = open_documents(layout, settings);
    let id = docs.create_from_template(template, &fill)?;

    settings.add_recent_template(&template.id);
    save_config_silent(settings);

    println!("{}", id);
    Ok(())
}

async fn ask(settings: &Settings, rest: &[String]) -> Result<()> {
    let action = match rest.first().map(String::as_str) {
        Some("generate") => AiAction::GenerateFormula,
        Some("explain") => AiAction::ExplainFormula,
        Some("fix") => AiAction::FixFormula,
        Some("summarize") => AiAction::Summarize,
        Some("improve") => AiAction::ImproveWriting,
        _ => return Err(Error::Application(USAGE.to_string())),
    };
    let input = rest.get(1).map(String::as_str).unwrap_or("");
    let context = match rest.get(2) {
        Some(context) if settings.ai.include_context => context.as_str(),
        _ => "",
    };

    let mut response = String::new();
    std::io::stdin().read_to_string(&mut response)?;

    let client = ScriptedClient::from_text(&response, 8);
    let mut session = AssistantSession::new(AiService::new(Arc::new(client)), action);
    info!("Replaying response for {} (model {})", action.label(), settings.ai.model);
    let phase = session.run(input, context).await.clone();
    info!("Assistant finished: {:?}", phase);

    let segments = session.segments();
    if let Some(formula) = &segments.formula {
        println!("formula: {}", formula);
    }
    println!("{}", segments.explanation);
    Ok(())
}

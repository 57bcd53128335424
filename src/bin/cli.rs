use anyhow::{anyhow, Result};
use colored::*;
use finextract::{
    core::{
        config::ExtractorConfig,
        service,
        types::{DocumentReport, ResultStatus},
    },
    entities::anthropic::AnthropicExtractor,
    pdf::{self, PageFailurePolicy},
    utils::progress::ProgressTracker,
};
use serde::Serialize;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "finextract-cli",
    about = "Extract financial statement fields from PDF documents"
)]
struct Opt {
    /// Only extract the raw text, without calling the model
    #[structopt(long)]
    text_only: bool,

    /// What to do with pages whose text cannot be extracted (fail or skip)
    #[structopt(long, default_value = "fail")]
    page_policy: PageFailurePolicy,

    /// PDF files to process
    #[structopt(parse(from_os_str), required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Serialize)]
struct TextOnly {
    filename: String,
    extracted_text: Option<String>,
    error: Option<String>,
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    let opt = Opt::from_args();

    for input in &opt.inputs {
        if !input.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input));
        }
    }

    let progress = ProgressTracker::new(opt.inputs.len() as u64, opt.inputs.len() > 1);

    if opt.text_only {
        let mut outputs = Vec::with_capacity(opt.inputs.len());
        for input in &opt.inputs {
            let filename = display_name(input);
            progress.start_document(&filename, "Extracting text");
            let output = match pdf::extract_text(input, opt.page_policy) {
                Ok(text) => TextOnly {
                    filename,
                    extracted_text: Some(text),
                    error: None,
                },
                Err(e) => TextOnly {
                    filename,
                    extracted_text: None,
                    error: Some(e.to_string()),
                },
            };
            outputs.push(output);
            progress.finish_document();
        }
        progress.finish();
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        return Ok(());
    }

    let config = ExtractorConfig::from_env()?;
    let extractor = AnthropicExtractor::new(config.anthropic())?;

    let mut results = Vec::with_capacity(opt.inputs.len());
    for input in &opt.inputs {
        let filename = display_name(input);
        progress.start_document(&filename, "Extracting");
        let result = service::analyze(
            input,
            &filename,
            input.display().to_string(),
            opt.page_policy,
            &extractor,
        )
        .await;
        results.push(result);
        progress.finish_document();
    }
    progress.finish();

    let reports: Vec<DocumentReport> = results.iter().map(DocumentReport::from).collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);

    let extracted = results
        .iter()
        .filter(|r| r.status == ResultStatus::Extracted)
        .count();
    let failed = results
        .iter()
        .filter(|r| {
            matches!(
                r.status,
                ResultStatus::EntityCallFailed | ResultStatus::TextExtractionFailed
            )
        })
        .count();
    let summary = format!(
        "{} document(s): {} extracted, {} without data, {} failed",
        results.len(),
        extracted,
        results.len() - extracted - failed,
        failed
    );
    if failed > 0 {
        eprintln!("{}", summary.red());
    } else {
        eprintln!("{}", summary.green());
    }

    Ok(())
}

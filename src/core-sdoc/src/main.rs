use std::path::PathBuf;

use clap::Parser;
use core_sdoc::{Pipeline, ProcessStatus, Settings, setup_logging, validate_url};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "core-sdoc")]
#[command(about = "Fetch a documentation page, then translate and annotate it with an LLM", long_about = None)]
struct Args {
    /// URL of the page to process
    #[arg(short, long, value_parser = parse_url)]
    url: Url,

    /// Write the processed Markdown to this file instead of stdout
    #[arg(short, long, value_parser = validate_output_file)]
    output: Option<PathBuf>,

    /// Print the full JSON response (links, status, error) instead of the Markdown
    #[arg(long, conflicts_with = "output")]
    json: bool,
}

fn parse_url(s: &str) -> Result<Url, String> {
    validate_url(s).map_err(|e| e.to_string())
}

fn validate_output_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if path.exists() && path.is_dir() {
        return Err(format!("Output path is a directory: {}", path.display()));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(format!(
            "Output file parent directory does not exist: {}",
            parent.display()
        ));
    }

    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if it exists
    dotenvy::dotenv().ok();

    setup_logging("core_sdoc=info");

    let args = Args::parse();
    let settings = Settings::from_env()?;
    let pipeline = Pipeline::from_settings(&settings)?;

    let response = pipeline.process(&args.url).await;
    let failed = response.status == ProcessStatus::Error;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if let Some(output) = &args.output {
        std::fs::write(output, &response.processed_markdown)?;
        tracing::info!("Wrote processed Markdown to {}", output.display());
    } else {
        println!("{}", response.processed_markdown);
    }

    if failed {
        if let Some(error) = &response.error {
            eprintln!("ERROR: {error}");
        }
        std::process::exit(1);
    }
    Ok(())
}

use std::{fs, io, path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, normalize_batch, ClientSettings, HttpClassifier, SubmitOutcome,
    WorkflowController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod render;

use render::{render_history, render_prediction};

#[derive(Parser, Debug)]
#[command(name = "detector", about = "Classify news articles as real or fake")]
struct Cli {
    /// Base URL of the prediction service; overrides detector.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a single article.
    Analyze {
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Classify several article files in one request.
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Check that the prediction service is up.
    Health,
    /// Read articles from stdin, one per line, keeping a running history.
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings().context("failed to load client settings")?;
    if let Some(api_url) = cli.api_url.as_deref() {
        settings = settings.with_api_url(api_url)?;
    }
    tracing::info!(api_url = %settings.api_url, "using prediction service");
    let classifier = Arc::new(HttpClassifier::from_settings(&settings));

    match cli.command {
        Command::Analyze { title, text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("failed to read article '{}'", path.display()))?,
                (None, None) => bail!("either --text or --file is required"),
            };
            let controller = WorkflowController::new(classifier);
            match controller.submit(&text, title.as_deref()).await {
                SubmitOutcome::Completed(prediction) => {
                    println!("{}", render_prediction(&prediction, settings.confidence_scale));
                }
                SubmitOutcome::Failed(err) => return Err(anyhow!(err.user_message())),
                SubmitOutcome::Superseded => bail!("submission was superseded"),
            }
        }
        Command::Batch { files } => run_batch(&classifier, &settings, files).await?,
        Command::Health => {
            let status = classifier
                .health()
                .await
                .map_err(|err| anyhow!(err.user_message()))?;
            println!("{}: {}", status.status, status.message);
            if !status.is_healthy() {
                bail!("prediction service reported status '{}'", status.status);
            }
        }
        Command::Interactive => run_interactive(classifier, &settings).await?,
    }

    Ok(())
}

async fn run_batch(
    classifier: &HttpClassifier,
    settings: &ClientSettings,
    files: Vec<PathBuf>,
) -> Result<()> {
    let texts = files
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read article '{}'", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch = classifier
        .classify_batch(texts.clone())
        .await
        .map_err(|err| anyhow!(err.user_message()))?;
    let predictions = normalize_batch(&batch, &texts).map_err(|err| anyhow!(err.user_message()))?;

    for (path, prediction) in files.iter().zip(&predictions) {
        println!("== {}", path.display());
        println!("{}", render_prediction(prediction, settings.confidence_scale));
    }
    Ok(())
}

async fn run_interactive(classifier: Arc<HttpClassifier>, settings: &ClientSettings) -> Result<()> {
    let controller = WorkflowController::new(classifier);
    let mut title: Option<String> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Paste an article per line. Commands: :title <text>, :history, :clear, :quit");
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim_end();
        match line {
            ":quit" => break,
            ":history" => {
                let state = controller.snapshot().await;
                println!("{}", render_history(&state.history, settings.confidence_scale));
            }
            ":clear" => {
                controller.clear().await;
                title = None;
                println!("History cleared.");
            }
            _ => {
                if let Some(rest) = line.strip_prefix(":title") {
                    let rest = rest.trim();
                    title = (!rest.is_empty()).then(|| rest.to_string());
                    continue;
                }
                match controller.submit(line, title.as_deref()).await {
                    SubmitOutcome::Completed(prediction) => {
                        println!("{}", render_prediction(&prediction, settings.confidence_scale));
                        title = None;
                    }
                    SubmitOutcome::Failed(err) => println!("Error: {}", err.user_message()),
                    SubmitOutcome::Superseded => {}
                }
            }
        }
    }
    Ok(())
}

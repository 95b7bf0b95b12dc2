use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    render::{render_job_history, render_results, sort_results},
    AssessmentApi, AssessmentClient, UploadFile, Workflow,
};
use shared::domain::JobId;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod config;
mod printer;

use config::{load_settings, normalize_server_url, Settings};

#[derive(Parser, Debug)]
#[command(name = "cvassess", about = "Rank candidate CVs against a job description")]
struct Cli {
    /// Assessment service base URL; overrides cvassess.toml and the environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a job description and CVs, evaluate them, and print ranked results.
    Assess {
        #[arg(long)]
        job: PathBuf,
        #[arg(required = true)]
        cvs: Vec<PathBuf>,
    },
    /// List previously uploaded job descriptions.
    Jobs,
    /// Print ranked results for an existing job.
    Results { job_id: String },
}

async fn read_files(paths: &[PathBuf]) -> Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

async fn run_assess(
    api: Arc<dyn AssessmentApi>,
    settings: &Settings,
    job: PathBuf,
    cvs: Vec<PathBuf>,
) -> Result<()> {
    let job_file = read_files(std::slice::from_ref(&job)).await?.remove(0);
    let cv_files = read_files(&cvs).await?;

    let workflow = Workflow::new(api, settings.workflow_options());
    let printer = printer::spawn(workflow.subscribe_events());
    workflow.load_job_history().await;

    let outcome = drive_workflow(&workflow, job_file, cv_files).await;

    drop(workflow);
    let _ = printer.await;
    outcome
}

async fn drive_workflow(
    workflow: &Workflow,
    job_file: UploadFile,
    cv_files: Vec<UploadFile>,
) -> Result<()> {
    if workflow.submit_job_description(job_file).await?.is_none() {
        warn!("job description is not a PDF; nothing was uploaded");
        return Ok(());
    }
    if workflow.submit_cvs(cv_files).await?.is_none() {
        warn!("none of the selected CVs is a PDF; nothing was uploaded");
        return Ok(());
    }
    if workflow.evaluation_trigger_enabled() {
        workflow.start_evaluation().await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    let server_url = normalize_server_url(&settings.server_url)?;
    let api: Arc<dyn AssessmentApi> = Arc::new(AssessmentClient::new(server_url));

    match cli.command {
        Command::Assess { job, cvs } => run_assess(api, &settings, job, cvs).await?,
        Command::Jobs => {
            let jobs = api
                .fetch_job_history()
                .await
                .context("failed to load job history")?;
            print!("{}", render_job_history(&jobs, None));
        }
        Command::Results { job_id } => {
            let mut results = api
                .fetch_results(&JobId(job_id))
                .await
                .context("failed to load results")?;
            sort_results(&mut results);
            print!("{}", render_results(&results));
        }
    }

    Ok(())
}

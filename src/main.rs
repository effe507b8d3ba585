use anyhow::Result;
use clap::Parser;
use log::error;
use std::path::Path;
use std::process;

use job_autofill::cli::{Cli, Commands};
use job_autofill::config::Settings;
use job_autofill::console::{Gate, Prompter};
use job_autofill::driver::{launch_browser, BrowserSession};
use job_autofill::gemini_client::{GeminiClient, GeminiConfig};
use job_autofill::profile::Details;
use job_autofill::resume::{derive_structured_resume, import_resume};
use job_autofill::webpage::WebDriverPage;
use job_autofill::{apply_to_job, preview_navigation, ApplyOutcome, AutofillError, ProfileStore};

const GENDERS: [&str; 4] = ["Male", "Female", "Other", "Prefer not to say"];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut settings = Settings::from_env();
    if let Some(path) = cli.profile {
        settings.profile_path = path;
    }

    let code = match run_command(cli.command, &settings).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            1
        }
    };
    process::exit(code);
}

async fn run_command(command: Commands, settings: &Settings) -> Result<i32> {
    let store = ProfileStore::new(&settings.profile_path);
    match command {
        Commands::Setup => run_setup(&store).await,
        Commands::ParseResume => run_parse_resume(settings, &store).await,
        Commands::Apply { url } => run_apply(url, settings, &store).await,
    }
}

async fn run_setup(store: &ProfileStore) -> Result<i32> {
    let mut prompter = Prompter::stdin();

    let api_key = prompter.ask_required("Enter your Gemini API key: ").await?;
    let resume_path = prompter.ask_required("Enter path to your resume: ").await?;

    let mut details = Details::new();
    let address = prompter.ask("Enter your address (optional): ").await?;
    details.insert("address".to_string(), address);
    let registration = prompter
        .ask("Enter your Registration or application number: ")
        .await?;
    details.insert("Registration/application number".to_string(), registration);
    let gender = prompter.choose("Select your gender:", &GENDERS, 3).await?;
    details.insert("gender".to_string(), gender);

    let profile = import_resume(store, &api_key, Path::new(&resume_path), details).await?;
    println!(
        "✅ Stored API key, resume ({} chars), and details in {}.",
        profile.resume_raw.len(),
        store.path().display()
    );
    println!("Next: run `job-autofill parse-resume`.");
    Ok(0)
}

async fn run_parse_resume(settings: &Settings, store: &ProfileStore) -> Result<i32> {
    let profile = store.load().await?;
    let client = GeminiClient::new(GeminiConfig::new(settings, &profile.api_key))?;

    println!("🤖 Asking {} to structure your resume...", client.model());
    let structured = derive_structured_resume(&client, store).await?;
    println!(
        "✅ Resume parsed and saved ({} skills, {} experience entries).",
        structured.skills.len(),
        structured.experience.len()
    );
    Ok(0)
}

async fn run_apply(url: Option<String>, settings: &Settings, store: &ProfileStore) -> Result<i32> {
    let mut prompter = Prompter::stdin();
    let url = match url {
        Some(u) => u,
        None => {
            prompter
                .ask_required("Give me the exact url of where you want me to apply: ")
                .await?
        }
    };

    println!("🚀 Launching visible Chrome (will remain open for review)...");
    let session = launch_browser(&settings.driver).await?;

    // Preview navigation so the page can be inspected before autofill starts.
    preview_navigation(&url, &WebDriverPage::new(&session.driver)).await;

    let result = gate_and_apply(&mut prompter, &session, &url, settings, store).await;
    session.detach();
    result
}

async fn gate_and_apply(
    prompter: &mut Prompter<tokio::io::BufReader<tokio::io::Stdin>>,
    session: &BrowserSession,
    url: &str,
    settings: &Settings,
    store: &ProfileStore,
) -> Result<i32> {
    if prompter.wait_for_go().await? == Gate::Exit {
        println!("Exiting. Browser remains open for manual inspection.");
        return Ok(0);
    }

    let page = WebDriverPage::new(&session.driver);
    let outcome = apply_to_job(url, store, &page, |api_key| {
        GeminiClient::new(GeminiConfig::new(settings, api_key))
            .map_err(|e| AutofillError::AiGenerationFailed(format!("{e:#}")))
    })
    .await?;

    if let ApplyOutcome::Failed(reason) = outcome {
        println!("Application attempt stopped: {reason}");
    }
    Ok(0)
}

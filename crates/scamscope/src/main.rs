//! Scamscope command line client.
//!
//! Thin presentation layer over the `scamscope-client` SDK: sign in, submit
//! suspected scam messages for analysis, browse past reports, and manage
//! the reference-case corpus.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scamscope_client::analysis::{AnalysisOutcome, AnalysisResult, ScamDocument};
use scamscope_client::session::{LoginRequest, RegisterRequest};
use scamscope_client::{
    AnalysisClient, ClientConfig, Error, FileCredentialStore, Gateway, SessionManager,
};

#[derive(Parser)]
#[command(name = "scamscope")]
#[command(version, about = "Scamscope Command Line Client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API server URL (overrides SCAMSCOPE_API_URL)
    #[arg(long)]
    server_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session tokens
    Login {
        /// Login identifier
        login_id: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Create an account (signs in on success)
    Register {
        /// Login identifier
        login_id: String,
        /// Password (at least 4 characters)
        #[arg(short, long)]
        password: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Email address
        #[arg(short, long)]
        email: String,
    },

    /// End the session and clear stored tokens
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List the analysis models the service offers
    Models,

    /// Analyze a suspected scam message
    Analyze {
        /// Message text to analyze (omit when using --file)
        prompt: Option<String>,

        /// Read the message from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Analysis model (defaults to the first available one)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List past analysis reports
    History {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Show one analysis report in full
    Show {
        /// Report document id
        id: String,

        /// Print the raw report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Submit a reference scam-case document (admin)
    SubmitDocument {
        /// Path to the document JSON file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match &cli.server_url {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env(),
    };

    tracing::debug!(base_url = %config.base_url, "using API server");

    let store = Arc::new(FileCredentialStore::new()?);
    let gateway = Arc::new(Gateway::new(&config, store.clone()));

    // Stand-in for the web app's redirect-to-login: react to forced
    // session teardown with a hint instead of navigation.
    let mut expired = gateway.subscribe();
    tokio::spawn(async move {
        if expired.recv().await.is_ok() {
            eprintln!("Session expired. Run `scamscope login` to sign in again.");
        }
    });

    let session = SessionManager::new(gateway.clone(), store);
    let analysis = AnalysisClient::new(gateway);

    match cli.command {
        Commands::Login { login_id, password } => {
            session
                .login(&LoginRequest {
                    login_id,
                    login_pw: password,
                })
                .await
                .map_err(report)?;
            match session.user() {
                Some(user) => println!("Signed in as {} <{}>", user.name, user.user_email),
                None => println!("Signed in."),
            }
        }

        Commands::Register {
            login_id,
            password,
            name,
            email,
        } => {
            session
                .register(&RegisterRequest {
                    login_id,
                    login_pw: password,
                    name,
                    email,
                })
                .await
                .map_err(report)?;
            println!("Account created and signed in.");
        }

        Commands::Logout => {
            session.logout().await;
            println!("Signed out.");
        }

        Commands::Whoami => {
            session.initialize().await;
            match session.user() {
                Some(user) => {
                    println!("{} <{}> (role: {})", user.name, user.user_email, user.role)
                }
                None => println!("Not signed in."),
            }
        }

        Commands::Models => {
            let models = analysis.available_models().await.map_err(report)?;
            for model in models {
                println!("{model}");
            }
        }

        Commands::Analyze {
            prompt,
            file,
            model,
        } => {
            let prompt = match (prompt, file) {
                (Some(prompt), None) => prompt,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                _ => anyhow::bail!("provide either a message or --file, not both"),
            };

            let model = match model {
                Some(model) => model,
                None => analysis
                    .available_models()
                    .await
                    .map_err(report)?
                    .into_iter()
                    .next()
                    .context("the service offers no analysis models")?,
            };

            let outcome = analysis.analyze(&prompt, &model).await.map_err(report)?;
            render_outcome(&outcome);
        }

        Commands::History { page, limit } => {
            let history = analysis.history(page, limit).await.map_err(report)?;
            println!(
                "Page {}/{} ({} reports total)",
                history.page, history.total_pages, history.total_elements
            );
            for entry in &history.contents {
                println!(
                    "{}  {}  {}",
                    entry.created_at, entry.document_id, entry.scam_type
                );
            }
        }

        Commands::Show { id, json } => {
            let detail = analysis.detail(&id).await.map_err(report)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                println!("Report {}", detail.document_id);
                println!("Submitted: {}", detail.created_at);
                println!("Prompt: {}", detail.prompt);
                println!();
                println!("Risk: {:?} (score {}/100, confidence {}%)",
                    detail.risk_assessment.risk_level,
                    detail.risk_assessment.risk_score,
                    detail.risk_assessment.confidence_level
                );
                println!("Summary: {}", detail.analysis_summary);
                println!(
                    "Classification: {:?} / {}",
                    detail.scam_classification.scam_type, detail.scam_classification.scam_sub_type
                );
            }
        }

        Commands::SubmitDocument { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            // Local validation: malformed JSON never reaches the server.
            let document = ScamDocument::from_json(&raw).map_err(report)?;
            analysis.submit_document(&document).await.map_err(report)?;
            println!("Document submitted: {}", document.scam_title);
        }
    }

    Ok(())
}

fn render_outcome(outcome: &AnalysisOutcome) {
    if !outcome.is_valid_analysis {
        println!(
            "Analysis declined: {}",
            outcome
                .invalid_reason
                .as_deref()
                .unwrap_or("no reason given")
        );
        return;
    }
    if let Some(result) = &outcome.analysis_result {
        render_result(result);
    }
    println!();
    println!(
        "Model: {} ({} ms)",
        outcome.analysis_details.model, outcome.analysis_details.total_processing_time_ms
    );
}

fn render_result(result: &AnalysisResult) {
    println!(
        "Risk: {:?} (score {}/100, confidence {}%)",
        result.risk_assessment.risk_level,
        result.risk_assessment.risk_score,
        result.risk_assessment.confidence_level
    );
    println!(
        "Classification: {:?} / {}",
        result.scam_classification.scam_type, result.scam_classification.scam_sub_type
    );
    println!("Reason: {}", result.scam_classification.classification_reason);
    println!();
    println!("{}", result.analysis_summary);

    if !result.detected_signals.is_empty() {
        println!();
        println!("Detected signals:");
        for signal in &result.detected_signals {
            println!(
                "  [{:?}] {} - {}",
                signal.severity, signal.signal_name, signal.explanation
            );
        }
    }

    if !result.psychological_tactics.is_empty() {
        println!();
        println!("Psychological tactics:");
        for tactic in &result.psychological_tactics {
            println!("  {} - {}", tactic.tactic_name, tactic.explanation);
        }
    }

    if !result.similar_cases.is_empty() {
        println!();
        println!("Similar cases:");
        for case in &result.similar_cases {
            println!(
                "  {} ({}% match, source: {})",
                case.case_title, case.similarity_score, case.case_source
            );
        }
    }

    println!();
    println!("What to do now:");
    for action in &result.recommendation.immediate_actions {
        println!("  - {action}");
    }
    println!("Reporting: {}", result.recommendation.reporting_guidance);
    for tip in &result.recommendation.prevention_tips {
        println!("  Tip: {tip}");
    }
}

/// Surface envelope field errors before converting to the exit error.
fn report(err: Error) -> anyhow::Error {
    if let Error::Api { field_errors, .. } = &err {
        for field_error in field_errors {
            eprintln!(
                "  {}: {} ({})",
                field_error.field, field_error.message, field_error.constraint
            );
        }
    }
    anyhow::Error::new(err)
}

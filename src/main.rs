use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use agro_cli::{
    parse_command, ui, wait_for, Completion, Debouncer, FormStore, PredictionSession, ReplCommand,
    Submission,
};
use agro_client::{ApiConfig, LocationEnricher, PredictionClient};
use agro_core::{disease_artifact, Artifact, Error, Field, FormDraft, PredictionResult, PredictionService};

const DEFAULT_LOG_FILTER: &str = "agrocast=info,agro_core=warn,agro_client=warn,agro_cli=warn";

#[derive(Parser)]
#[command(name = "agrocast")]
#[command(about = "Crop yield prediction and plant disease detection client", long_about = None)]
struct Cli {
    /// Prediction service base URL (overrides API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// File the interactive form is saved to
    #[arg(long, global = true, env = "AGRO_STATE_FILE", default_value = ".agrocast_form.json")]
    state_file: PathBuf,

    /// Start the interactive mode with auto-predict enabled
    #[arg(long)]
    auto: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the yield for one set of inputs
    Predict(PredictArgs),
    /// Show the device location and current weather
    Locate,
    /// Analyse a leaf image for disease
    Disease {
        image: PathBuf,
        /// Directory to write the disease report to
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Check whether the prediction service is ready
    Health,
}

#[derive(Args)]
struct PredictArgs {
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<String>,
    #[arg(long)]
    humidity: Option<String>,
    #[arg(long)]
    soil_type: Option<String>,
    #[arg(long)]
    crop_type: Option<String>,
    #[arg(long)]
    water_flow: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<String>,
    /// Directory to write the yield report to
    #[arg(long)]
    export: Option<PathBuf>,
}

impl PredictArgs {
    /// Values given on the command line, over the default form
    fn draft(&self) -> FormDraft {
        let mut draft = FormDraft::default();
        for (field, value) in [
            (Field::Temperature, &self.temperature),
            (Field::Humidity, &self.humidity),
            (Field::SoilType, &self.soil_type),
            (Field::CropType, &self.crop_type),
            (Field::WaterFlow, &self.water_flow),
            (Field::Latitude, &self.latitude),
            (Field::Longitude, &self.longitude),
        ] {
            if let Some(value) = value {
                draft.set(field, value.clone());
            }
        }
        draft
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ApiConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url;
    }
    tracing::info!(api_base_url = %config.api_base_url, "using prediction service");

    let enricher = LocationEnricher::from_config(&config)?;
    let client: Arc<dyn PredictionService> = Arc::new(PredictionClient::new(config)?);

    match cli.command {
        Some(Commands::Predict(args)) => predict_once(client.as_ref(), &args).await,
        Some(Commands::Locate) => {
            let enrichment = enricher.enrich().await?;
            ui::render_enrichment(&enrichment);
            Ok(())
        }
        Some(Commands::Disease { image, export }) => {
            analyse_disease(client.as_ref(), &image, export.as_deref()).await
        }
        Some(Commands::Health) => {
            let health = client.health().await?;
            ui::render_health(&health);
            if !health.is_ready() {
                bail!("crop model is not ready");
            }
            Ok(())
        }
        None => {
            let store = FormStore::new(&cli.state_file);
            run_interactive(client, enricher, store, cli.auto).await
        }
    }
}

async fn predict_once(client: &dyn PredictionService, args: &PredictArgs) -> Result<()> {
    let mut session = PredictionSession::with_draft(args.draft());

    match session.submit(client).await {
        Ok(Completion::Recorded(entry)) => {
            ui::render_prediction(&entry);
            if let Some(dir) = &args.export {
                let path = write_artifact(dir, &session.export()?).await?;
                println!("{} Report saved to {}", "💾".green(), path.display());
            }
            Ok(())
        }
        Ok(Completion::Failed(message)) => bail!(message),
        Ok(Completion::Stale) => Ok(()),
        Err(Error::Validation(errors)) => {
            ui::render_validation_errors(&errors);
            bail!("invalid input")
        }
        Err(e) => Err(e.into()),
    }
}

async fn analyse_disease(client: &dyn PredictionService, image: &Path, export: Option<&Path>) -> Result<()> {
    let bytes = tokio::fs::read(image).await?;
    let file_name = image
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    println!("{} Analysing {}...", "🔬".blue(), file_name);
    let result = client.detect_disease(&file_name, bytes).await?;
    ui::render_disease(&result);

    if let Some(dir) = export {
        let path = write_artifact(dir, &disease_artifact(&result, Some(&file_name))?).await?;
        println!("{} Report saved to {}", "💾".green(), path.display());
    }
    Ok(())
}

async fn write_artifact(dir: &Path, artifact: &Artifact) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.content).await?;
    Ok(path)
}

type Outcome = (Submission, agro_core::Result<PredictionResult>);

/// State of the interactive mode
struct App {
    client: Arc<dyn PredictionService>,
    enricher: LocationEnricher,
    store: FormStore,
    session: PredictionSession,
    debouncer: Debouncer,
    auto_predict: bool,
    outcomes: mpsc::UnboundedSender<Outcome>,
}

impl App {
    fn new(
        client: Arc<dyn PredictionService>,
        enricher: LocationEnricher,
        store: FormStore,
        session: PredictionSession,
        auto_predict: bool,
    ) -> (Self, mpsc::UnboundedReceiver<Outcome>) {
        let (outcomes, results) = mpsc::unbounded_channel();
        let app = Self {
            client,
            enricher,
            store,
            session,
            debouncer: Debouncer::default(),
            auto_predict,
            outcomes,
        };
        (app, results)
    }

    /// Validate and send the form without blocking the input loop.
    /// Returns false when the form has errors.
    fn dispatch(&mut self) -> bool {
        let submission = match self.session.begin_submission() {
            Ok(submission) => submission,
            Err(_) => return false,
        };

        let client = self.client.clone();
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let outcome = client.predict(submission.input()).await;
            // The receiver only goes away on exit
            let _ = outcomes.send((submission, outcome));
        });
        true
    }

    fn on_outcome(&mut self, submission: Submission, outcome: agro_core::Result<PredictionResult>) {
        println!();
        match self.session.complete(submission, outcome) {
            Completion::Recorded(entry) => ui::render_prediction(&entry),
            Completion::Failed(message) => ui::render_error(&message),
            Completion::Stale => {}
        }
    }

    async fn save_form(&self) {
        if let Err(e) = self.store.save(self.session.draft()).await {
            tracing::warn!(path = %self.store.path().display(), error = %e, "failed to save form");
        }
    }

    async fn form_changed(&mut self) {
        self.save_form().await;
        if self.auto_predict {
            self.debouncer.touch();
        }
    }

    /// Returns false when the user asked to exit
    async fn handle(&mut self, command: ReplCommand) -> Result<bool> {
        match command {
            ReplCommand::Set { field, value } => {
                match self.session.set_field(field, value) {
                    Some(message) => println!("{} {}", "⚠️".yellow(), message.yellow()),
                    None => println!("{} {} updated", "✓".green(), field.label()),
                }
                self.form_changed().await;
            }
            ReplCommand::Unset(field) => {
                self.session.clear_field(field);
                println!("{} {} cleared", "✓".green(), field.label());
                self.form_changed().await;
            }
            ReplCommand::Show => ui::render_form(self.session.draft(), self.session.errors()),
            ReplCommand::Predict => {
                self.debouncer.cancel();
                if self.dispatch() {
                    println!("{} Predicting...", "🤖".blue());
                } else {
                    ui::render_validation_errors(self.session.errors());
                }
            }
            ReplCommand::Auto(enabled) => {
                self.auto_predict = enabled;
                if !enabled {
                    self.debouncer.cancel();
                }
                let state = if enabled { "on".green() } else { "off".dimmed() };
                println!("Auto-predict is {}", state);
            }
            ReplCommand::Locate => {
                println!("{} Locating...", "📍".blue());
                match self.enricher.enrich().await {
                    Ok(enrichment) => {
                        self.session.apply_enrichment(&enrichment);
                        ui::render_enrichment(&enrichment);
                        self.form_changed().await;
                    }
                    Err(e) => ui::render_error(&e.to_string()),
                }
            }
            ReplCommand::History => ui::render_history(self.session.history()),
            ReplCommand::ClearHistory => {
                self.session.clear_history();
                println!("{} History cleared", "✓".green());
            }
            ReplCommand::Chart => match self.session.charts() {
                Some(charts) => ui::render_charts(&charts),
                None => ui::render_error(&Error::NoResult.to_string()),
            },
            ReplCommand::Export { dir } => match self.session.export() {
                Ok(artifact) => {
                    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
                    match write_artifact(&dir, &artifact).await {
                        Ok(path) => println!("{} Report saved to {}", "💾".green(), path.display()),
                        Err(e) => ui::render_error(&e.to_string()),
                    }
                }
                Err(e) => ui::render_error(&e.to_string()),
            },
            ReplCommand::Copy { detailed } => {
                let summary = if detailed {
                    self.session.detailed_summary()
                } else {
                    self.session.clipboard_summary()
                };
                match summary {
                    Ok(summary) => println!("{}", summary),
                    Err(e) => ui::render_error(&e.to_string()),
                }
            }
            ReplCommand::Reset => {
                self.debouncer.cancel();
                self.session.reset();
                self.save_form().await;
                println!("{} Form reset", "✓".green());
            }
            ReplCommand::Disease { path } => {
                if let Err(e) = analyse_disease(self.client.as_ref(), &path, None).await {
                    ui::render_error(&e.to_string());
                }
            }
            ReplCommand::Health => match self.client.health().await {
                Ok(health) => ui::render_health(&health),
                Err(e) => ui::render_error(&e.to_string()),
            },
            ReplCommand::Help => ui::print_help(),
            ReplCommand::Exit => return Ok(false),
        }
        Ok(true)
    }
}

fn prompt() -> io::Result<()> {
    print!("{} ", "agrocast>".green().bold());
    io::stdout().flush()
}

async fn run_interactive(
    client: Arc<dyn PredictionService>,
    enricher: LocationEnricher,
    store: FormStore,
    auto_predict: bool,
) -> Result<()> {
    let draft = store.load().await?.unwrap_or_default();
    let session = PredictionSession::with_draft(draft);
    let (mut app, mut results) = App::new(client, enricher, store, session, auto_predict);

    ui::display_banner();
    if app.enricher.has_location() && app.session.draft().latitude.is_none() {
        app.handle(ReplCommand::Locate).await?;
    }

    run_loop(&mut app, BufReader::new(tokio::io::stdin()), &mut results).await?;

    println!("{}", "👋 Goodbye!".green());
    Ok(())
}

/// Read commands until `exit` or end of input, then settle pending work:
/// an armed auto-predict is sent right away and in-flight predictions are
/// awaited, so piped input still gets its results.
async fn run_loop<R>(
    app: &mut App,
    input: R,
    results: &mut mpsc::UnboundedReceiver<Outcome>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Some(command)) => {
                        if !app.handle(command).await? {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => ui::render_error(&message),
                }
            }
            _ = wait_for(app.debouncer.deadline()) => {
                app.debouncer.cancel();
                if app.dispatch() {
                    println!();
                    println!("{} Auto-predicting...", "🤖".blue());
                }
            }
            Some((submission, outcome)) = results.recv() => {
                app.on_outcome(submission, outcome);
            }
        }
        prompt()?;
    }

    if app.debouncer.is_armed() {
        app.debouncer.cancel();
        app.dispatch();
    }
    while app.session.is_pending() {
        let Some((submission, outcome)) = results.recv().await else { break };
        app.on_outcome(submission, outcome);
    }
    Ok(())
}

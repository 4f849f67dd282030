use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formentry_core::config::provider_capability_from_env_value;
use formentry_core::constants::DEFAULT_PROVIDER_ROLE;
use formentry_core::domain::Encounter;
use formentry_core::in_memory::InMemoryDirectory;
use formentry_core::services::{IdentityResolver, StaticMessages, SystemClock};
use formentry_core::{
    EncounterDetailElement, EncounterDetailParameters, FormElement, FormEntryConfig,
    FormEntryContext, FormEntryServices, FormEntrySession, FormMode, Submission,
};

#[derive(Parser)]
#[command(name = "formentry")]
#[command(about = "Encounter detail form preview and submission CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the element markup
    Render {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Validate a submission and, if accepted, print the resulting encounter as JSON
    Submit {
        #[command(flatten)]
        form: FormArgs,
        /// YAML map of field name to submitted value(s)
        #[arg(long)]
        submission: PathBuf,
    },
}

#[derive(Args)]
struct FormArgs {
    /// Directory snapshot (YAML)
    #[arg(long)]
    directory: PathBuf,
    /// Element parameters (YAML)
    #[arg(long)]
    element: PathBuf,
    /// Form mode: enter, edit or view
    #[arg(long, default_value = "enter")]
    mode: String,
    /// Existing encounter (YAML)
    #[arg(long)]
    encounter: Option<PathBuf>,
    /// Authenticated user (person id, uuid or username)
    #[arg(long)]
    user: Option<String>,
}

/// Existing encounter as written in fixtures; people and places are directory references.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EncounterFixture {
    #[serde(default)]
    encounter_datetime: Option<NaiveDateTime>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    voided: bool,
}

/// Everything loaded from the command line before the element is built.
struct LoadedForm {
    directory: InMemoryDirectory,
    params: EncounterDetailParameters,
    context: FormEntryContext,
}

/// Main entry point for the formentry CLI
///
/// Loads a directory snapshot and element parameters, builds the encounter detail element
/// and either renders it or runs a submission through validation and application.
///
/// # Environment Variables
/// - `FORMENTRY_DEFAULT_LOCATION`: location preselected when nothing else applies
/// - `FORMENTRY_DEFAULT_PROVIDER_ROLE`: role listing providers when provider records are
///   unavailable (default: "Provider")
/// - `FORMENTRY_PROVIDER_ENTITIES`: whether provider records exist (default: true)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("formentry=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config_from_env()?;
    tracing::info!(
        "++ Provider listing: {:?}, default role '{}'",
        config.provider_capability(),
        config.default_provider_role()
    );

    match cli.command {
        Commands::Render { form } => render(&config, &form),
        Commands::Submit { form, submission } => submit(&config, &form, &submission),
    }
}

fn config_from_env() -> anyhow::Result<FormEntryConfig> {
    let capability =
        provider_capability_from_env_value(std::env::var("FORMENTRY_PROVIDER_ENTITIES").ok())?;
    let role = std::env::var("FORMENTRY_DEFAULT_PROVIDER_ROLE")
        .unwrap_or_else(|_| DEFAULT_PROVIDER_ROLE.to_string());
    let default_location = std::env::var("FORMENTRY_DEFAULT_LOCATION").ok();

    Ok(FormEntryConfig::new(default_location, role, capability)?)
}

fn render(config: &FormEntryConfig, args: &FormArgs) -> anyhow::Result<()> {
    let LoadedForm {
        directory,
        params,
        mut context,
    } = load_form(config, args)?;
    let providers = config.provider_source();
    let messages = StaticMessages::english();
    let services = FormEntryServices {
        resolver: &directory,
        directory: &directory,
        messages: &messages,
        clock: &SystemClock,
        providers: providers.as_ref(),
    };

    let element = EncounterDetailElement::new(&mut context, &params, &services)?;
    for (field, kind) in context.registry().fields() {
        tracing::debug!("registered {} as {:?}", field, kind);
    }
    println!("{}", element.render(&mut context));
    Ok(())
}

fn submit(config: &FormEntryConfig, args: &FormArgs, submission_path: &Path) -> anyhow::Result<()> {
    let LoadedForm {
        directory,
        params,
        mut context,
    } = load_form(config, args)?;
    let submission = load_submission(submission_path)?;
    let providers = config.provider_source();
    let messages = StaticMessages::english();
    let services = FormEntryServices {
        resolver: &directory,
        directory: &directory,
        messages: &messages,
        clock: &SystemClock,
        providers: providers.as_ref(),
    };

    let element = EncounterDetailElement::new(&mut context, &params, &services)?;

    let errors = element.validate(&submission, &services);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{}: {}", error.field, error.message);
        }
        context.record_errors(&errors);
        println!("{}", element.render(&mut context));
        anyhow::bail!("submission rejected with {} errors", errors.len());
    }

    let mut session = FormEntrySession::for_context(context);
    element.apply_submission(&mut session, &submission, &services)?;
    tracing::info!("++ Applied submission to encounter");

    let output = serde_json::json!({
        "encounter": session.encounter,
        "voidEncounter": session.void_encounter(),
        "previousEncounterDate": session.context.previous_encounter_date(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_form(config: &FormEntryConfig, args: &FormArgs) -> anyhow::Result<LoadedForm> {
    let directory = InMemoryDirectory::from_yaml_file(&args.directory)
        .with_context(|| format!("loading directory {}", args.directory.display()))?;
    let params_text = std::fs::read_to_string(&args.element)
        .with_context(|| format!("reading element parameters {}", args.element.display()))?;
    let params = EncounterDetailParameters::from_yaml_str(&params_text)?;
    let mode: FormMode = args.mode.parse()?;

    let default_location = config.default_location().and_then(|reference| {
        let location = directory.location(reference);
        if location.is_none() {
            tracing::warn!("configured default location '{}' not found", reference);
        }
        location
    });
    let authenticated_person = args
        .user
        .as_deref()
        .map(|token| {
            directory
                .person(token)
                .with_context(|| format!("unknown user {token}"))
        })
        .transpose()?;

    let mut context = FormEntryContext::new(mode)
        .with_default_location(default_location)
        .with_authenticated_person(authenticated_person);
    if let Some(path) = &args.encounter {
        context = context.with_existing_encounter(load_encounter(path, &directory)?);
    }

    Ok(LoadedForm {
        directory,
        params,
        context,
    })
}

fn load_encounter(path: &Path, directory: &InMemoryDirectory) -> anyhow::Result<Encounter> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading encounter {}", path.display()))?;
    let fixture: EncounterFixture = serde_yaml::from_str(&text)?;

    let provider = fixture
        .provider
        .as_deref()
        .map(|token| {
            directory
                .person(token)
                .with_context(|| format!("unknown encounter provider {token}"))
        })
        .transpose()?;
    let location = fixture
        .location
        .as_deref()
        .map(|token| {
            directory
                .location(token)
                .with_context(|| format!("unknown encounter location {token}"))
        })
        .transpose()?;

    Ok(Encounter {
        encounter_datetime: fixture.encounter_datetime,
        provider,
        location,
        voided: fixture.voided,
    })
}

/// Reads a YAML map of field name to a scalar or a list of scalars.
fn load_submission(path: &Path) -> anyhow::Result<Submission> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading submission {}", path.display()))?;
    let raw: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(&text)?;

    let mut submission = Submission::new();
    for (field, value) in raw {
        match value {
            serde_yaml::Value::Sequence(items) => {
                for item in items {
                    submission.push(&field, scalar_text(&field, item)?);
                }
            }
            other => submission.push(&field, scalar_text(&field, other)?),
        }
    }
    Ok(submission)
}

fn scalar_text(field: &str, value: serde_yaml::Value) -> anyhow::Result<String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        _ => anyhow::bail!("field {field} must hold a scalar or a list of scalars"),
    }
}

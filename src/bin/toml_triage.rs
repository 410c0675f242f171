use clap::Parser;
use symptom_triage::app::{bootstrap, console};
use symptom_triage::config::credentials::ApiCredential;
use symptom_triage::core::ConfigProvider;
use symptom_triage::utils::{logger, validation::Validate};
use symptom_triage::{DirectoryState, DoctorDirectory, LocalStorage, TomlConfig, TriageError};

#[derive(Parser)]
#[command(name = "toml-triage")]
#[command(about = "Symptom triage assistant configured from a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "triage-config.toml")]
    config: String,

    /// Analyse a single description and exit
    #[arg(short, long)]
    symptom: Option<String>,

    /// Print each outcome as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Validate the configuration and doctor data without calling the model
    #[arg(long)]
    dry_run: bool,
}

fn fail(context: &str, e: &TriageError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code().max(1));
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("   Model: {} ({})", config.model_name(), config.model_endpoint());
    tracing::info!("   Temperature: {}", config.temperature());
    tracing::info!(
        "   Timeout: {:?}, retries: {}",
        config.request_timeout(),
        config.retry_attempts()
    );
    tracing::info!("   Doctors: {}", config.doctors_path());
    tracing::info!("   Matching: {:?}", config.match_mode());
    tracing::info!("   History limit: {}", config.history_limit());
    tracing::info!(
        "   Catalog: {}",
        if config.catalog.is_some() { "custom" } else { "built-in" }
    );
}

async fn perform_dry_run(config: &TomlConfig) -> Result<(), TriageError> {
    let credential_present = ApiCredential::from_env(config.api_key_env()).is_ok();
    println!(
        "🔑 {}: {}",
        config.api_key_env(),
        if credential_present { "present" } else { "missing" }
    );

    let catalog = config.catalog()?;
    println!(
        "📚 Catalog: {} specialties, {} keyword rules",
        catalog.specialties().len(),
        catalog.keywords().len()
    );

    let directory = DirectoryState::from_load(
        DoctorDirectory::load(&LocalStorage::current_dir(), config.doctors_path(), &catalog).await,
    );
    match &directory {
        DirectoryState::Loaded(directory) => {
            let present: Vec<String> = directory
                .specialties()
                .iter()
                .map(|s| s.to_string())
                .collect();
            println!(
                "👩‍⚕️ Doctors: {} loaded ({})",
                directory.len(),
                present.join(", ")
            );
        }
        DirectoryState::Unavailable(reason) => println!("⚠️ Doctors unavailable: {}", reason),
    }

    println!("🔍 Dry run complete, no request was sent");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based triage assistant");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        fail("Configuration validation failed", &e);
    }
    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No advice request will be sent");
        if let Err(e) = perform_dry_run(&config).await {
            fail("Dry run failed", &e);
        }
        return Ok(());
    }

    let credential = match ApiCredential::from_env(config.api_key_env()) {
        Ok(credential) => credential,
        Err(e) => fail("Credential check failed", &e),
    };

    let mut session =
        match bootstrap::build_local_session(&config, credential, config.prompt_template()).await {
            Ok(session) => session,
            Err(e) => fail("Startup failed", &e),
        };

    let format = if args.json {
        console::OutputFormat::Json
    } else {
        console::OutputFormat::Text
    };
    let mut stdout = std::io::stdout();

    match &args.symptom {
        Some(symptom) => {
            if let Err(e) = console::run_once(&mut session, symptom, &mut stdout, format).await {
                fail("Analysis failed", &e);
            }
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            console::run_interactive(&mut session, stdin, &mut stdout, format).await?;
        }
    }

    Ok(())
}

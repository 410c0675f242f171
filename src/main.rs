use clap::Parser;
use symptom_triage::app::{bootstrap, console};
use symptom_triage::config::credentials::{ApiCredential, API_KEY_ENV};
use symptom_triage::core::prompt::PromptTemplate;
use symptom_triage::utils::{logger, validation::Validate};
use symptom_triage::{CliConfig, TriageError};

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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在時忽略
    let _ = dotenvy::dotenv();
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting symptom-triage CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 金鑰缺少時立即結束
    let credential = match ApiCredential::from_env(API_KEY_ENV) {
        Ok(credential) => credential,
        Err(e) => fail("Credential check failed", &e),
    };

    if let Err(e) = config.validate() {
        fail("Configuration validation failed", &e);
    }

    let mut session =
        match bootstrap::build_local_session(&config, credential, PromptTemplate::default()).await
        {
            Ok(session) => session,
            Err(e) => fail("Startup failed", &e),
        };

    let format = if config.json {
        console::OutputFormat::Json
    } else {
        console::OutputFormat::Text
    };
    let mut stdout = std::io::stdout();

    match &config.symptom {
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

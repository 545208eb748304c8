use std::sync::Arc;

use anyhow::{Context, bail};

use fittrack_core::config::CoreConfig;
use fittrack_core::onboarding::OnboardingResolver;
use fittrack_core::plans::PlanSelector;
use fittrack_core::store::{DocumentStore, LibSqlStore};

const USAGE: &str = "Usage: fittrack <status|plan|plans|skip> <user_id>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CoreConfig::from_env()?;

    // Initialize tracing (stderr, so stdout stays machine-readable)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, user_id) = match args.as_slice() {
        [command, user_id] => (command.as_str(), user_id.as_str()),
        _ => bail!(USAGE),
    };

    let store: Arc<dyn DocumentStore> = Arc::new(
        LibSqlStore::new_local(&config.db_path)
            .await
            .with_context(|| format!("opening store at {}", config.db_path.display()))?,
    );

    let output = match command {
        "status" => {
            let resolver = OnboardingResolver::new(store);
            serde_json::to_value(resolver.status(user_id).await?)?
        }
        "plan" => {
            let selector = PlanSelector::new(store);
            serde_json::to_value(selector.try_current_plan(user_id).await?)?
        }
        "plans" => {
            let selector = PlanSelector::new(store);
            serde_json::to_value(selector.try_all_plans(user_id).await?)?
        }
        "skip" => {
            let resolver = OnboardingResolver::new(store);
            resolver.skip(Some(user_id)).await?;
            serde_json::json!({ "skipped": true })
        }
        other => bail!("unknown command '{other}'. {USAGE}"),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

use anyhow::Context;
use pricefinder_analyzer::{AnalyzerError, RankerSettings};
use pricefinder_core::AppConfig;

pub(crate) async fn run_models(config: &AppConfig, gemini_key: &str) -> anyhow::Result<()> {
    let client = RankerSettings::from(config)
        .client(gemini_key)
        .context("failed to build Gemini client")?;
    let models = client.list_models().await.context("failed to list models")?;

    let mut generative = 0_usize;
    for model in models.iter().filter(|m| m.supports_generate_content()) {
        generative += 1;
        match model.input_token_limit {
            Some(limit) => println!(
                "{:<40} {} ({limit} input tokens)",
                model.id(),
                model.display_name
            ),
            None => println!("{:<40} {}", model.id(), model.display_name),
        }
    }

    tracing::info!(total = models.len(), generative, "model listing complete");
    Ok(())
}

/// Checks every configured candidate in order and reports each one, where the
/// ranker stops at the first usable model.
pub(crate) async fn run_check(config: &AppConfig, gemini_key: &str) -> anyhow::Result<()> {
    let settings = RankerSettings::from(config);
    let client = settings
        .client(gemini_key)
        .context("failed to build Gemini client")?;

    let mut usable = Vec::new();
    for model in &settings.models {
        match client.get_model(model).await {
            Ok(info) => {
                println!("{model:<30} ok");
                usable.push(info.id().to_owned());
            }
            Err(AnalyzerError::ModelNotFound { .. }) => println!("{model:<30} not found"),
            Err(e @ AnalyzerError::InvalidCredential { .. }) => {
                return Err(e).context("Gemini rejected the key");
            }
            Err(e) => println!("{model:<30} error: {e}"),
        }
    }

    match usable.first() {
        Some(model) => println!("searches will rank with {model}"),
        None => println!("no candidate model is usable; searches will rank by price alone"),
    }
    Ok(())
}

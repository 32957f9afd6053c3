use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use crate::{
    error::AppError,
    normalize::{parse_model_output, Recipe},
    state::AppState,
    upload::ImageInput,
};

/// Lets a signed-in user spend their own Mistral quota.
pub const API_KEY_HEADER: &str = "x-mistral-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub model: String,
    pub processing_time_ms: u128,
}

/// A non-blank per-request key wins over the configured one.
pub fn resolve_api_key<'a>(
    state: &'a AppState,
    request_key: Option<&'a str>,
) -> Result<&'a str, AppError> {
    request_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .or(state.config.mistral_api_key.as_deref())
        .ok_or(AppError::MissingApiKey)
}

pub async fn generate(
    state: &AppState,
    request_key: Option<&str>,
    image: ImageInput,
    started: Instant,
) -> Result<GeneratedRecipe, AppError> {
    let api_key = resolve_api_key(state, request_key).inspect_err(|_| {
        error!("No Mistral API key configured or supplied");
    })?;

    let (width, height) = image.dimensions();
    info!(
        width,
        height,
        format = ?image.source_format(),
        "Analyzing image"
    );

    let raw = state
        .mistral
        .complete(api_key, &image.to_data_url())
        .await
        .inspect_err(|e| error!(error = %e, "Mistral request failed"))?;

    let recipe = parse_model_output(&raw).inspect_err(|e| {
        error!(error = %e, raw = %e.raw(), "Error parsing model output");
    })?;

    info!(
        dish = %recipe.dish_name,
        items = recipe.grocery_list.len(),
        "Recipe generated"
    );

    Ok(GeneratedRecipe {
        recipe,
        model: state.mistral.model().to_string(),
        processing_time_ms: started.elapsed().as_millis(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state_with_key(key: Option<&str>) -> std::sync::Arc<AppState> {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.mistral_api_key = key.map(str::to_string);
        AppState::new(config).unwrap()
    }

    #[test]
    fn request_key_overrides_configured_key() {
        let state = state_with_key(Some("server-key"));
        assert_eq!(resolve_api_key(&state, Some(" user-key ")).unwrap(), "user-key");
    }

    #[test]
    fn blank_request_key_falls_back_to_configured_key() {
        let state = state_with_key(Some("server-key"));
        assert_eq!(resolve_api_key(&state, Some("  ")).unwrap(), "server-key");
        assert_eq!(resolve_api_key(&state, None).unwrap(), "server-key");
    }

    #[test]
    fn no_key_anywhere_is_a_configuration_error() {
        let state = state_with_key(None);
        assert!(matches!(
            resolve_api_key(&state, None),
            Err(AppError::MissingApiKey)
        ));
    }

    #[test]
    fn response_flattens_recipe_fields() {
        let generated = GeneratedRecipe {
            recipe: Recipe {
                dish_name: "Soup".to_string(),
                recipe: "<p>Boil</p>".to_string(),
                grocery_list: vec!["1 onion".to_string()],
            },
            model: "pixtral-12b".to_string(),
            processing_time_ms: 42,
        };

        let value = serde_json::to_value(&generated).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "dishName": "Soup",
                "recipe": "<p>Boil</p>",
                "groceryList": ["1 onion"],
                "model": "pixtral-12b",
                "processingTimeMs": 42
            })
        );
    }
}

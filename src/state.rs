use std::sync::Arc;

use crate::{
    config::Config,
    mistral::{MistralClient, MistralError},
};

pub struct AppState {
    pub config: Config,
    pub mistral: MistralClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, MistralError> {
        let mistral = MistralClient::new(
            &config.mistral_base_url,
            &config.mistral_model,
            config.request_timeout,
        )?;

        Ok(Arc::new(Self { config, mistral }))
    }
}

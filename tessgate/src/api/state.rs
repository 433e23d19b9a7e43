use std::sync::Arc;

use crate::config::Config;
use crate::engine::TesseractEngine;
use crate::error::Result;
use crate::input::ImageResolver;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: TesseractEngine,
    pub resolver: ImageResolver,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let engine = TesseractEngine::new(&config.engine);
        let resolver = ImageResolver::new(&config.fetch)?;

        Ok(Self {
            config: Arc::new(config),
            engine,
            resolver,
        })
    }
}

//! Translation adapter boundary.

use async_trait::async_trait;

use crate::models::LanguageCode;

/// Asynchronous text translation service.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`. `None` or blank text means failure;
    /// no further error detail is available.
    async fn translate(&self, text: &str, target: LanguageCode) -> Option<String>;
}

/// Translator used when no translation service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTranslator;

#[async_trait]
impl Translator for UnavailableTranslator {
    async fn translate(&self, _text: &str, target: LanguageCode) -> Option<String> {
        tracing::debug!("No translation service configured; cannot translate to {target}");
        None
    }
}

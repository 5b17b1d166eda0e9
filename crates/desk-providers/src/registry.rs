//! Provider assembly.

use desk_core::traits::NewsProvider;
use std::sync::Arc;
use tracing::debug;

use crate::alphavantage::AlphaVantageNewsProvider;
use crate::fetcher::Fetcher;
use crate::finnhub::FinnhubNewsProvider;
use crate::yahoo::YahooNewsProvider;

/// API keys for the keyed providers. A `None` key disables its provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub alphavantage: Option<String>,
    pub finnhub: Option<String>,
}

impl ProviderKeys {
    /// Read keys from the named environment variables. Unset or empty
    /// variables leave the key absent.
    pub fn from_env(alphavantage_var: &str, finnhub_var: &str) -> Self {
        let read = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        Self {
            alphavantage: read(alphavantage_var),
            finnhub: read(finnhub_var),
        }
    }
}

/// News providers in priority order: Yahoo (primary, keyless), Alpha
/// Vantage (secondary), Finnhub (tertiary).
///
/// Keyed providers are always included; without a key they report
/// themselves disabled and the aggregator skips them.
pub fn build_news_providers(fetcher: Arc<dyn Fetcher>, keys: &ProviderKeys) -> Vec<Arc<dyn NewsProvider>> {
    let providers: Vec<Arc<dyn NewsProvider>> = vec![
        Arc::new(YahooNewsProvider::new(Arc::clone(&fetcher))),
        Arc::new(AlphaVantageNewsProvider::new(
            Arc::clone(&fetcher),
            keys.alphavantage.clone(),
        )),
        Arc::new(FinnhubNewsProvider::new(fetcher, keys.finnhub.clone())),
    ];

    for provider in providers.iter().filter(|p| !p.is_enabled()) {
        debug!(provider = provider.name(), "News provider disabled: no API key");
    }
    providers
}

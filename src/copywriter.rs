//! Marketing-copy acquisition. The generative source sits behind the
//! [`CopySource`] capability so the orchestrator never sees its transport;
//! any failure degrades to the deterministic fallback bank.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn, error};

use crate::fallback;
use crate::models::{PromotionalBrief, TextVariation};

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A generative text source able to produce marketing-copy variations.
#[async_trait]
pub trait CopySource: Send + Sync {
    async fn produce_variations(
        &self,
        brief: &PromotionalBrief,
        quantity: u32,
        language: &str,
    ) -> Result<Vec<TextVariation>, CopyError>;
}

/// Acquire `quantity` variations, never returning an empty list for
/// quantity >= 1. Network, auth, quota and parse failures are all treated the
/// same: the fallback bank takes over. No retry happens at this layer.
pub async fn acquire(
    source: &dyn CopySource,
    brief: &PromotionalBrief,
    quantity: u32,
    language: &str,
) -> Vec<TextVariation> {
    match source.produce_variations(brief, quantity, language).await {
        Ok(variations) if !variations.is_empty() => {
            info!("✅ Acquired {} AI copy variations for '{}'", variations.len(), brief.product);
            variations
        }
        Ok(_) => {
            warn!("⚠️ Copy source returned zero usable variations, using fallback bank");
            fallback::fallback_variations(brief, quantity, language)
        }
        Err(e) => {
            error!("❌ Copy source failed ({}), using fallback bank", e);
            fallback::fallback_variations(brief, quantity, language)
        }
    }
}

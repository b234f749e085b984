use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use std::collections::HashMap;

/// Pixel dimensions of one output format.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct FormatSize {
    pub width: u32,
    pub height: u32,
}

/// Standard social-media sizes used whenever a brief does not override them.
pub fn default_target_sizes() -> HashMap<String, FormatSize> {
    HashMap::from([
        ("facebook".to_string(), FormatSize { width: 1200, height: 630 }),
        ("instagram".to_string(), FormatSize { width: 1080, height: 1080 }),
        ("story".to_string(), FormatSize { width: 1080, height: 1920 }),
    ])
}

fn default_business_type() -> String { "local business".to_string() }
fn default_validity() -> String { "limited time".to_string() }
fn default_location() -> String { "our store".to_string() }

/// The promotional brief supplied by the caller. Read-only to the pipeline.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PromotionalBrief {
    pub product: String,
    #[serde(default = "default_business_type")]
    pub business_type: String,
    pub offer: String,
    #[serde(default = "default_validity")]
    pub validity: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub schedule: String,
    /// Base colors, cycled across the batch by index.
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default = "default_target_sizes")]
    pub target_sizes: HashMap<String, FormatSize>,
}

/// One set of marketing copy. Length caps are enforced only by the fallback
/// bank; AI-sourced text is trusted as-is.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TextVariation {
    pub title: String,
    pub subtitle: String,
    pub call_to_action: String,
    pub description: String,
    pub tone: String,
}

/// Canvas parameters for one batch cell, derived per (color, format) pair.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub text_color: String,
    pub accent_color: String,
}

/// One successfully rendered output file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratedFlyer {
    pub filename: String,
    pub variation: TextVariation,
    pub background_color: String,
    pub format: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FlyerBatch {
    pub id: Uuid,
    pub product: String,
    pub language: String,
    pub requested: u32,
    pub flyers: Vec<GeneratedFlyer>,
    pub created_at: DateTime<Utc>,
}

fn default_quantity() -> u32 { 3 }

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerateRequest {
    pub brief: PromotionalBrief,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub formats: Option<Vec<String>>, // e.g. ["facebook", "story"]
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuickGenerateRequest {
    pub product: String,
    pub offer: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

use crate::copywriter::{CopyError, CopySource};
use crate::models::{PromotionalBrief, TextVariation};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use reqwest::Client;
use tracing::{info, error};

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let base_url = std::env::var("GEMINI_API_BASE")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Instruction payload: brief fields plus the JSON schema the model must
    /// emit. "es" has a dedicated instruction; any other tag gets English.
    pub fn build_copy_prompt(brief: &PromotionalBrief, quantity: u32, language: &str) -> String {
        if language.to_ascii_lowercase().starts_with("es") {
            format!(
                "Eres un redactor publicitario para un negocio tipo \"{business}\". \
                Genera exactamente {quantity} variaciones de texto promocional para: \
                producto \"{product}\", oferta \"{offer}\", vigencia \"{validity}\", \
                ubicación \"{location}\", teléfono \"{phone}\", horario \"{schedule}\". \
                Cada variación debe tener un tono y un ángulo de venta distintos. \
                Responde únicamente con un arreglo JSON de {quantity} objetos, cada uno con \
                estos cinco campos: \
                \"title\" (máx 8 palabras), \"subtitle\" (máx 12 palabras), \
                \"callToAction\" (máx 5 palabras), \"description\" (máx 30 palabras), \
                \"tone\" (una palabra, p.ej. \"urgent\", \"elegant\"). Sin texto adicional.",
                business = brief.business_type,
                quantity = quantity,
                product = brief.product,
                offer = brief.offer,
                validity = brief.validity,
                location = brief.location,
                phone = brief.phone,
                schedule = brief.schedule,
            )
        } else {
            format!(
                "You are an advertising copywriter for a \"{business}\" business. \
                Generate exactly {quantity} promotional copy variations for: \
                product \"{product}\", offer \"{offer}\", validity \"{validity}\", \
                location \"{location}\", phone \"{phone}\", schedule \"{schedule}\". \
                Each variation must use a distinct tone and sales angle. \
                Respond with nothing but a JSON array of {quantity} objects, each with \
                these five fields: \
                \"title\" (max 8 words), \"subtitle\" (max 12 words), \
                \"callToAction\" (max 5 words), \"description\" (max 30 words), \
                \"tone\" (one word, e.g. \"urgent\", \"elegant\"). No extra text.",
                business = brief.business_type,
                quantity = quantity,
                product = brief.product,
                offer = brief.offer,
                validity = brief.validity,
                location = brief.location,
                phone = brief.phone,
                schedule = brief.schedule,
            )
        }
    }

    async fn perform_api_call(&self, prompt: &str) -> Result<String, CopyError> {
        let url = format!(
            "{}/models/gemini-1.5-flash:generateContent?key={}",
            self.base_url, self.api_key
        );

        info!("🔗 Making request to: {}", url.replace(&self.api_key, "***"));

        let request_body = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "temperature": 0.9,
                "topP": 0.95,
                "topK": 40,
                "maxOutputTokens": 2048,
                "responseMimeType": "application/json"
            }
        });

        let response = self.client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CopyError::Http(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ API Error response: {}", error_body);
            return Err(CopyError::Http(format!("status={} body={}", status, error_body)));
        }

        let response_text = response.text().await
            .map_err(|e| CopyError::Http(e.to_string()))?;

        let parsed: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| CopyError::Malformed(format!("parse error: {}", e)))?;

        extract_first_text(&parsed)
            .ok_or_else(|| CopyError::Malformed("no text content in response".to_string()))
    }

    /// Parse the model's payload into variations. Only objects carrying all
    /// five required string fields survive; the rest are dropped silently.
    pub fn parse_variations(payload: &str) -> Result<Vec<TextVariation>, CopyError> {
        let body = strip_code_fences(payload);
        let items: Vec<serde_json::Value> = serde_json::from_str(body)
            .map_err(|e| CopyError::Malformed(format!("expected a JSON array: {}", e)))?;

        let variations = items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                let field = |key: &str| obj.get(key)?.as_str().map(str::to_string);
                Some(TextVariation {
                    title: field("title")?,
                    subtitle: field("subtitle")?,
                    call_to_action: field("callToAction")?,
                    description: field("description")?,
                    tone: field("tone")?,
                })
            })
            .collect();
        Ok(variations)
    }
}

#[async_trait]
impl CopySource for GeminiClient {
    async fn produce_variations(
        &self,
        brief: &PromotionalBrief,
        quantity: u32,
        language: &str,
    ) -> Result<Vec<TextVariation>, CopyError> {
        if self.api_key == "DEMO_KEY" {
            // Demo mode: route straight to the fallback bank upstream.
            info!("Using demo mode - no Gemini call made");
            return Err(CopyError::Http("demo mode, no API key".to_string()));
        }

        info!("Generating {} copy variations with Gemini API...", quantity);
        let prompt = Self::build_copy_prompt(brief, quantity, language);
        let payload = self.perform_api_call(&prompt).await?;
        let variations = Self::parse_variations(&payload)?;
        info!("📝 Parsed {}/{} well-formed variations", variations.len(), quantity);
        Ok(variations)
    }
}

/// Tolerate models that wrap the array in a markdown code fence.
fn strip_code_fences(payload: &str) -> &str {
    let trimmed = payload.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Other(serde_json::Value),
}

fn extract_first_text(resp: &GeminiResponse) -> Option<String> {
    for c in &resp.candidates {
        for p in &c.content.parts {
            if let Part::Text { text } = p {
                return Some(text.trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_target_sizes;
    use pretty_assertions::assert_eq;

    fn variation_json(title: &str) -> String {
        format!(
            r#"{{"title":"{}","subtitle":"s","callToAction":"c","description":"d","tone":"fun"}}"#,
            title
        )
    }

    #[test]
    fn parses_well_formed_array() {
        let payload = format!("[{},{}]", variation_json("A"), variation_json("B"));
        let variations = GeminiClient::parse_variations(&payload).unwrap();
        assert_eq!(variations.len(), 2);
        assert_eq!(variations[0].title, "A");
        assert_eq!(variations[1].call_to_action, "c");
    }

    #[test]
    fn drops_objects_missing_required_fields() {
        let payload = format!(
            r#"[{},{{"title":"no other fields"}},{{"subtitle":"only"}}]"#,
            variation_json("keep")
        );
        let variations = GeminiClient::parse_variations(&payload).unwrap();
        assert_eq!(variations.len(), 1);
        assert_eq!(variations[0].title, "keep");
    }

    #[test]
    fn drops_objects_with_non_string_fields() {
        let payload = r#"[{"title":1,"subtitle":"s","callToAction":"c","description":"d","tone":"t"}]"#;
        let variations = GeminiClient::parse_variations(payload).unwrap();
        assert!(variations.is_empty());
    }

    #[test]
    fn tolerates_markdown_fences() {
        let payload = format!("```json\n[{}]\n```", variation_json("fenced"));
        let variations = GeminiClient::parse_variations(&payload).unwrap();
        assert_eq!(variations[0].title, "fenced");
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(GeminiClient::parse_variations("not json at all").is_err());
        assert!(GeminiClient::parse_variations(r#"{"an":"object"}"#).is_err());
    }

    #[test]
    fn extracts_first_text_part() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":" hello "}]}}]}"#;
        let resp: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_first_text(&resp), Some("hello".to_string()));
    }

    #[test]
    fn prompt_embeds_brief_and_schema() {
        let brief = PromotionalBrief {
            product: "Pizza".to_string(),
            business_type: "restaurant".to_string(),
            offer: "50% off".to_string(),
            validity: "today".to_string(),
            location: "Main St".to_string(),
            phone: "555".to_string(),
            schedule: "9-5".to_string(),
            colors: vec![],
            target_sizes: default_target_sizes(),
        };
        let en = GeminiClient::build_copy_prompt(&brief, 4, "en");
        assert!(en.contains("Pizza") && en.contains("callToAction") && en.contains('4'));
        let es = GeminiClient::build_copy_prompt(&brief, 4, "es-MX");
        assert!(es.contains("redactor"));
        // unknown tags fall back to the English instruction
        let de = GeminiClient::build_copy_prompt(&brief, 4, "de");
        assert!(de.contains("copywriter"));
    }
}

//! Brand, copy, and document generation.
//!
//! Every generator has a deterministic fallback: an unavailable model or an
//! unparseable reply never fails the caller.

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::llm::{CompletionRequest, LanguageModel};

const BRAND_TEMPERATURE: f32 = 0.3;
const COPY_TEMPERATURE: f32 = 0.7;
const DOCUMENT_TEMPERATURE: f32 = 0.3;

const BRAND_PROMPT: &str = "You design brand identities for African e-commerce businesses. \
Reply with a single JSON object with these string fields: industry, primary_color (hex), \
heading_font (one of 'Instrument Serif', 'Playfair Display', 'Montserrat', 'Oswald', \
'Cormorant Garamond'), body_font (one of 'Inter', 'Roboto', 'Poppins', 'Work Sans'), \
tagline (at most 8 words), brand_mantra (one sentence).";

const COPY_PROMPT: &str = "You write storefront copy for African e-commerce brands. \
Reply with a single JSON object with these string fields: hero_title (at most 8 words), \
hero_description (at most 20 words), footer_description (at most 25 words). \
Bold, direct, active voice.";

const DESCRIPTION_PROMPT: &str =
    "You are a product copywriter for African e-commerce brands. Be concise and compelling.";

/// Visual identity for a new store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandIdentity {
    pub industry: String,
    pub primary_color: String,
    pub heading_font: String,
    pub body_font: String,
    pub tagline: String,
    pub brand_mantra: String,
}

impl BrandIdentity {
    /// Identity used when the model is unavailable.
    #[must_use]
    pub fn fallback(niche: &str) -> Self {
        Self {
            industry: "General E-commerce".to_owned(),
            primary_color: "#4f35e8".to_owned(),
            heading_font: "Instrument Serif".to_owned(),
            body_font: "Inter".to_owned(),
            tagline: format!("The best of {niche}"),
            brand_mantra: format!("Elevating the {niche} experience for African customers."),
        }
    }
}

/// Headline and footer copy for a storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontCopy {
    pub hero_title: String,
    pub hero_description: String,
    pub footer_description: String,
}

impl StorefrontCopy {
    /// Copy used when the model is unavailable.
    #[must_use]
    pub fn fallback(store_name: &str, niche: &str) -> Self {
        Self {
            hero_title: format!("Welcome to {store_name}"),
            hero_description: format!("Discover the best {niche} products curated just for you."),
            footer_description: format!(
                "{store_name} — Your trusted destination for quality {niche} products."
            ),
        }
    }
}

/// `refund_policy` → `Refund Policy`.
#[must_use]
pub fn title_case(s: &str) -> String {
    s.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The outermost `{...}` in a reply, ignoring code fences and chatter.
fn json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    raw.get(start..=end)
}

async fn complete_text<M: LanguageModel>(model: &M, request: CompletionRequest) -> Option<String> {
    match model.complete(request).await {
        Ok(completion) => completion
            .content
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty()),
        Err(e) => {
            warn!(error = %e, "Creative generation failed");
            None
        }
    }
}

async fn complete_json<M, T>(model: &M, request: CompletionRequest) -> Option<T>
where
    M: LanguageModel,
    T: for<'de> Deserialize<'de>,
{
    let text = complete_text(model, request).await?;
    let parsed = json_object(&text).and_then(|json| serde_json::from_str(json).ok());
    if parsed.is_none() {
        warn!("Model reply was not the expected JSON object");
    }
    parsed
}

/// Design a brand identity, falling back to [`BrandIdentity::fallback`].
#[instrument(skip(model))]
pub async fn design_brand<M: LanguageModel>(
    model: &M,
    store_name: &str,
    niche: &str,
) -> BrandIdentity {
    let request = CompletionRequest::new(
        BRAND_PROMPT,
        format!("Design a brand for '{store_name}', a {niche} business targeting African customers."),
    )
    .with_temperature(BRAND_TEMPERATURE)
    .json();

    complete_json(model, request)
        .await
        .unwrap_or_else(|| BrandIdentity::fallback(niche))
}

/// Write storefront copy, falling back to [`StorefrontCopy::fallback`].
#[instrument(skip(model, brand))]
pub async fn write_storefront_copy<M: LanguageModel>(
    model: &M,
    store_name: &str,
    niche: &str,
    brand: &BrandIdentity,
) -> StorefrontCopy {
    let request = CompletionRequest::new(
        COPY_PROMPT,
        format!(
            "Business: {store_name}\nNiche: {niche}\nIndustry: {}\nBrand mantra: {}",
            brand.industry, brand.brand_mantra
        ),
    )
    .with_temperature(COPY_TEMPERATURE)
    .json();

    complete_json(model, request)
        .await
        .unwrap_or_else(|| StorefrontCopy::fallback(store_name, niche))
}

/// Write a short product description.
#[instrument(skip(model))]
pub async fn describe_product<M: LanguageModel>(
    model: &M,
    name: &str,
    category: Option<&str>,
    features: Option<&str>,
) -> String {
    let mut prompt = format!("Write a compelling, SEO-friendly product description for '{name}'");
    if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!(" in the {category} category"));
    }
    if let Some(features) = features.filter(|f| !f.trim().is_empty()) {
        prompt.push_str(&format!(" with these features: {features}"));
    }
    prompt.push_str(". Max 3 sentences. Return only the description text.");

    let request = CompletionRequest::new(DESCRIPTION_PROMPT, prompt).with_temperature(COPY_TEMPERATURE);
    complete_text(model, request)
        .await
        .unwrap_or_else(|| format!("Premium quality {name}."))
}

/// Draft a business document such as a refund policy.
#[instrument(skip(model, details, business_context))]
pub async fn draft_document<M: LanguageModel>(
    model: &M,
    doc_type: &str,
    details: &str,
    business_context: Option<&str>,
) -> String {
    let mut system = "You write clear, professional documents for African e-commerce \
                      businesses. Return only the document content."
        .to_owned();
    if let Some(context) = business_context {
        system.push_str("\n\nBusiness context:\n");
        system.push_str(context);
    }

    let request = CompletionRequest::new(
        system,
        format!(
            "Write a {} for this business. Details: {details}",
            doc_type.replace('_', " ")
        ),
    )
    .with_temperature(DOCUMENT_TEMPERATURE);

    complete_text(model, request).await.unwrap_or_else(|| {
        format!("I couldn't generate the {} right now. Please try again.", title_case(doc_type))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("refund_policy"), "Refund Policy");
        assert_eq!(title_case("primary_color"), "Primary Color");
        assert_eq!(title_case("TERMS"), "Terms");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_json_object_strips_fences() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(json_object(raw), Some("{\"a\": 1}"));
        assert_eq!(json_object("no json here"), None);
    }

    #[test]
    fn test_fallbacks() {
        let brand = BrandIdentity::fallback("skincare");
        assert_eq!(brand.primary_color, "#4f35e8");
        assert_eq!(brand.tagline, "The best of skincare");

        let copy = StorefrontCopy::fallback("Glow", "skincare");
        assert_eq!(copy.hero_title, "Welcome to Glow");
        assert_eq!(
            copy.footer_description,
            "Glow — Your trusted destination for quality skincare products."
        );
    }
}

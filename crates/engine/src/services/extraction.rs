//! Free-text product list extraction.

use serde_json::Value;
use tracing::{instrument, warn};

use mona_core::Money;

use crate::llm::{CompletionRequest, LanguageModel};
use crate::models::NewProduct;

const EXTRACTION_TEMPERATURE: f32 = 0.1;

const EXTRACTION_PROMPT: &str = "You extract product data from messy merchant text. \
Return ONLY a JSON array of objects with keys: name (string), price (number, no currency \
symbols), stock_quantity (integer, default 0), description (string, optional), \
sku (string, optional). No commentary.";

/// Ask the model to turn a pasted product list into structured products.
///
/// Returns an empty list when the model is unavailable or its reply holds no
/// JSON array. Rows are not validated here; the bulk insert skips bad ones.
#[instrument(skip(model, text), fields(text_len = text.len()))]
pub async fn extract_products<M: LanguageModel>(model: &M, text: &str) -> Vec<NewProduct> {
    let request = CompletionRequest::new(EXTRACTION_PROMPT, format!("Extract products from:\n{text}"))
        .with_temperature(EXTRACTION_TEMPERATURE);

    let reply = match model.complete(request).await {
        Ok(completion) => completion.text_or_empty().to_owned(),
        Err(e) => {
            warn!(error = %e, "Product extraction failed");
            return Vec::new();
        }
    };

    parse_product_array(&reply)
}

/// Parse the JSON array between the first `[` and the last `]`.
#[must_use]
pub fn parse_product_array(reply: &str) -> Vec<NewProduct> {
    let Some(json) = reply
        .find('[')
        .zip(reply.rfind(']'))
        .and_then(|(start, end)| reply.get(start..=end))
    else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<Value>>(json) {
        Ok(items) => items.iter().filter_map(product_from_value).collect(),
        Err(e) => {
            warn!(error = %e, "Extracted product list was not valid JSON");
            Vec::new()
        }
    }
}

/// Models quote numbers about as often as they don't.
fn product_from_value(value: &Value) -> Option<NewProduct> {
    let object = value.as_object()?;
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    let price = match object.get("price") {
        Some(Value::Number(n)) => n.as_f64().and_then(Money::from_f64),
        Some(Value::String(s)) => Money::parse(s),
        _ => None,
    }
    .unwrap_or_default();

    let stock_quantity = match object.get("stock_quantity").or_else(|| object.get("stock")) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .unwrap_or(0);

    Some(NewProduct {
        name: text("name").unwrap_or_default(),
        description: text("description"),
        price,
        sku: text("sku"),
        stock_quantity,
        ..NewProduct::default()
    })
}

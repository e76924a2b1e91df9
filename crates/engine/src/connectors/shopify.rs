//! Shopify REST Admin API connector.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::Sha256;
use tracing::{debug, instrument};
use url::Url;

use mona_core::Money;

use super::{CommercePlatform, ConnectorError, NormalizedOrder, NormalizedProduct};

/// Platform tag stamped on synced rows.
pub const PLATFORM: &str = "shopify";

/// Header carrying the webhook signature.
pub const WEBHOOK_HMAC_HEADER: &str = "X-Shopify-Hmac-Sha256";

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one Shopify store.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    base: Url,
    api_version: String,
}

impl ShopifyClient {
    /// Build a client for `shop_url`. A missing scheme means `https://`.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::InvalidUrl` if the URL does not parse, or
    /// `ConnectorError::Http` if the HTTP client cannot be built.
    pub fn new(
        shop_url: &str,
        access_token: &SecretString,
        api_version: &str,
    ) -> Result<Self, ConnectorError> {
        let base = shop_base_url(shop_url)?;

        let mut token = HeaderValue::from_str(access_token.expose_secret())
            .map_err(|_| ConnectorError::MissingToken)?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                base,
                api_version: api_version.to_owned(),
            }),
        })
    }

    /// The store's base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str) -> Result<T, ConnectorError> {
        let path = format!("admin/api/{}/{resource}", self.inner.api_version);
        let url = self
            .inner
            .base
            .join(&path)
            .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .map_or(2, |secs| secs.ceil() as u64);
            return Err(ConnectorError::RateLimited(retry_after));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

impl CommercePlatform for ShopifyClient {
    #[instrument(skip(self), fields(store = %self.inner.base))]
    async fn fetch_products(&self) -> Result<Vec<NormalizedProduct>, ConnectorError> {
        let page: ProductsPage = self.get("products.json").await?;
        debug!(count = page.products.len(), "Fetched Shopify products");
        Ok(page.products.into_iter().map(normalize_product).collect())
    }

    #[instrument(skip(self), fields(store = %self.inner.base))]
    async fn fetch_orders(&self) -> Result<Vec<NormalizedOrder>, ConnectorError> {
        let page: OrdersPage = self.get("orders.json?status=any").await?;
        debug!(count = page.orders.len(), "Fetched Shopify orders");
        Ok(page.orders.into_iter().map(normalize_order).collect())
    }
}

fn shop_base_url(shop_url: &str) -> Result<Url, ConnectorError> {
    let trimmed = shop_url.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        format!("{trimmed}/")
    } else {
        format!("https://{trimmed}/")
    };
    let url = Url::parse(&with_scheme).map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(ConnectorError::InvalidUrl(shop_url.to_owned()));
    }
    Ok(url)
}

/// Display name for a new store: the first label of its host.
#[must_use]
pub fn store_name_from_url(shop_url: &str) -> String {
    let host = shop_url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    host.split(['.', '/'])
        .next()
        .filter(|label| !label.is_empty())
        .unwrap_or(host)
        .to_owned()
}

// ---------------------------------------------------------------------------
// REST payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProductsPage {
    #[serde(default)]
    products: Vec<ShopifyProduct>,
}

#[derive(Debug, Deserialize)]
struct OrdersPage {
    #[serde(default)]
    orders: Vec<ShopifyOrder>,
}

#[derive(Debug, Deserialize)]
struct ShopifyProduct {
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    variants: Vec<ShopifyVariant>,
    #[serde(default)]
    image: Option<ShopifyImage>,
}

#[derive(Debug, Deserialize)]
struct ShopifyVariant {
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    inventory_quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ShopifyImage {
    src: String,
}

#[derive(Debug, Deserialize)]
struct ShopifyOrder {
    id: Value,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    total_price: Option<String>,
    #[serde(default)]
    financial_status: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// The first variant carries price, SKU, and stock.
fn normalize_product(p: ShopifyProduct) -> NormalizedProduct {
    let variant = p.variants.into_iter().next();
    let (price, sku, stock_quantity) = variant.map_or((None, None, 0), |v| {
        (
            v.price.as_deref().and_then(Money::parse),
            v.sku.filter(|s| !s.is_empty()),
            v.inventory_quantity.unwrap_or(0),
        )
    });

    NormalizedProduct {
        external_id: id_string(&p.id),
        name: p.title.unwrap_or_default(),
        description: p.body_html.filter(|s| !s.is_empty()),
        price: price.unwrap_or_default(),
        sku,
        stock_quantity,
        image_url: p.image.map(|i| i.src),
        platform: PLATFORM,
    }
}

fn normalize_order(o: ShopifyOrder) -> NormalizedOrder {
    NormalizedOrder {
        external_id: id_string(&o.id),
        customer_email: o.email.filter(|e| !e.trim().is_empty()),
        total_amount: o
            .total_price
            .as_deref()
            .and_then(Money::parse)
            .unwrap_or_default(),
        status: o.financial_status.unwrap_or_else(|| "pending".to_owned()),
        created_at: o.created_at,
        platform: PLATFORM,
    }
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

/// Verify a webhook body against its base64 HMAC-SHA256 signature.
///
/// # Errors
///
/// Returns `ConnectorError::InvalidSignature` if the signature does not match.
pub fn verify_webhook(
    secret: &SecretString,
    body: &[u8],
    signature: &str,
) -> Result<(), ConnectorError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| ConnectorError::InvalidSignature)?;
    mac.update(body);
    let expected = BASE64.encode(mac.finalize().into_bytes());

    if constant_time_compare(&expected, signature.trim()) {
        Ok(())
    } else {
        Err(ConnectorError::InvalidSignature)
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_product_uses_first_variant() {
        let raw: ShopifyProduct = serde_json::from_value(json!({
            "id": 632_910_392,
            "title": "Ankara Tote",
            "body_html": "<p>Hand-stitched</p>",
            "variants": [
                {"price": "15000.00", "sku": "ANK-1", "inventory_quantity": 4},
                {"price": "99.00", "sku": "IGNORED", "inventory_quantity": 100}
            ],
            "image": {"src": "https://cdn.shopify.com/tote.jpg"}
        }))
        .unwrap();

        let product = normalize_product(raw);
        assert_eq!(product.external_id, "632910392");
        assert_eq!(product.price, Money::parse("15000").unwrap());
        assert_eq!(product.sku.as_deref(), Some("ANK-1"));
        assert_eq!(product.stock_quantity, 4);
        assert_eq!(product.image_url.as_deref(), Some("https://cdn.shopify.com/tote.jpg"));
        assert_eq!(product.platform, PLATFORM);
    }

    #[test]
    fn test_normalize_product_without_variants() {
        let raw: ShopifyProduct = serde_json::from_value(json!({"id": 1, "title": "Bare"})).unwrap();
        let product = normalize_product(raw);
        assert_eq!(product.price, Money::ZERO);
        assert_eq!(product.stock_quantity, 0);
        assert!(product.sku.is_none());
    }

    #[test]
    fn test_normalize_order() {
        let raw: ShopifyOrder = serde_json::from_value(json!({
            "id": 450_789_469,
            "email": "bob@example.com",
            "total_price": "598.94",
            "financial_status": "paid",
            "created_at": "2023-10-01T12:00:00-04:00"
        }))
        .unwrap();

        let order = normalize_order(raw);
        assert_eq!(order.external_id, "450789469");
        assert_eq!(order.total_amount, Money::parse("598.94").unwrap());
        assert_eq!(order.status, "paid");
        assert_eq!(
            order.created_at.unwrap().to_rfc3339(),
            "2023-10-01T16:00:00+00:00"
        );
    }

    #[test]
    fn test_shop_base_url() {
        assert_eq!(
            shop_base_url("glow.myshopify.com").unwrap().as_str(),
            "https://glow.myshopify.com/"
        );
        assert_eq!(
            shop_base_url("http://localhost:9000/").unwrap().as_str(),
            "http://localhost:9000/"
        );
        assert!(shop_base_url("https://").is_err());
    }

    #[test]
    fn test_store_name_from_url() {
        assert_eq!(store_name_from_url("glow.myshopify.com"), "glow");
        assert_eq!(store_name_from_url("https://kente.myshopify.com/"), "kente");
    }

    #[test]
    fn test_verify_webhook() {
        let secret = SecretString::from("hush".to_owned());
        let body = br#"{"id": 1}"#;
        let mut mac = Hmac::<Sha256>::new_from_slice(b"hush").unwrap();
        mac.update(body);
        let signature = BASE64.encode(mac.finalize().into_bytes());

        assert!(verify_webhook(&secret, body, &signature).is_ok());
        assert!(matches!(
            verify_webhook(&secret, b"tampered", &signature),
            Err(ConnectorError::InvalidSignature)
        ));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
    }
}

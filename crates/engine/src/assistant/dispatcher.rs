//! Executes a parsed [`Action`] against the tenant's data.
//!
//! Handlers return [`Outcome::Clarify`] for anything the merchant can fix by
//! rephrasing (unknown product, bad status). Only unexpected failures come
//! back as [`DispatchError`].

use askama::Template;
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, instrument};

use mona_core::{Money, OrderStatus, StockLevel, TenantId};

use crate::db::{
    CustomerRepository, OrderRepository, ProductRepository, RepositoryError,
    StoreSettingsRepository,
};
use crate::llm::LanguageModel;
use crate::models::{DEFAULT_NICHE, DEFAULT_STORE_NAME, ProductUpdate, StoreSettingsUpdate};
use crate::services::creative::{self, title_case};
use crate::services::extraction::extract_products;

use super::actions::{
    Action, AddProducts, CreateDocument, CreateInvoice, CustomizeBranding, ListArgs, SetupStore,
    UpdateOrderStatus, UpdateProductStock,
};
use super::reply::{Branding, ChatReply, Widget};

const DEFAULT_PRODUCT_LIMIT: i64 = 50;
const DEFAULT_ORDER_LIMIT: i64 = 20;
const DEFAULT_CUSTOMER_LIMIT: i64 = 20;
const MAX_LIST_LIMIT: i64 = 200;

/// Reply for a tool the dispatcher does not know, when the model said nothing.
pub const SNAG_REPLY: &str =
    "I understood what you want but hit a snag executing it. Can you try rephrasing?";

const PRODUCT_FORMAT_HINT: &str = "I couldn't read a clear product list from that. \
Try sending it like this:\n\n\
Black Sneakers, size 40-45, ₦15,000, stock: 20\n\
White T-shirt, S-XL, ₦5,000, stock: 50";

/// Result of a handler that may need more input from the merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    /// The request could not be carried out as stated; ask the merchant.
    Clarify(String),
}

impl<T> Outcome<T> {
    /// Collapse into `T`, turning a clarification into a value with `f`.
    pub fn unwrap_or_else(self, f: impl FnOnce(String) -> T) -> T {
        match self {
            Self::Done(value) => value,
            Self::Clarify(message) => f(message),
        }
    }
}

/// Failures a merchant cannot fix by rephrasing.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

type HandlerResult = Result<Outcome<ChatReply>, DispatchError>;

#[derive(Template)]
#[template(path = "assistant/invoice.txt")]
struct InvoiceTemplate<'a> {
    invoice_id: &'a str,
    issued_on: String,
    store_name: &'a str,
    customer: &'a str,
    lines: Vec<String>,
    total: Money,
}

/// Runs actions for one tenant.
pub struct Dispatcher<'a, M> {
    pool: &'a SqlitePool,
    model: &'a M,
    tenant: Option<&'a TenantId>,
}

impl<'a, M: LanguageModel> Dispatcher<'a, M> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, model: &'a M, tenant: Option<&'a TenantId>) -> Self {
        Self {
            pool,
            model,
            tenant,
        }
    }

    /// Execute `action`.
    ///
    /// `message` is the merchant's original text, used as a default input by
    /// some handlers. `snapshot` is passed to document drafting as context, and
    /// `router_text` is what the model said alongside its tool call.
    ///
    /// # Errors
    ///
    /// Returns a `DispatchError` if a data operation or template render fails.
    #[instrument(skip_all, fields(user_id = ?self.tenant, tool = action.tool_name()))]
    pub async fn dispatch(
        &self,
        action: Action,
        message: &str,
        snapshot: &str,
        router_text: &str,
    ) -> HandlerResult {
        match action {
            Action::ListProducts(args) => self.list_products(args).await,
            Action::AddProducts(args) => self.add_products(args, message).await,
            Action::UpdateProductStock(args) => self.update_product_stock(args).await,
            Action::ListOrders(args) => self.list_orders(args).await,
            Action::UpdateOrderStatus(args) => self.update_order_status(args).await,
            Action::ListCustomers(args) => self.list_customers(args).await,
            Action::CreateInvoice(args) => self.create_invoice(args).await,
            Action::SetupStore(args) => self.setup_store(args).await,
            Action::CustomizeBranding(args) => self.customize_branding(args).await,
            Action::CreateDocument(args) => self.create_document(args, message, snapshot).await,
            Action::Unknown(name) => {
                tracing::warn!(tool = %name, "Model chose an unknown tool");
                let content = if router_text.trim().is_empty() {
                    SNAG_REPLY
                } else {
                    router_text
                };
                Ok(Outcome::Done(ChatReply::text(content)))
            }
        }
    }

    fn products(&self) -> ProductRepository<'a> {
        ProductRepository::new(self.pool, self.tenant)
    }

    async fn list_products(&self, args: ListArgs) -> HandlerResult {
        let limit = clamp_limit(args.limit, DEFAULT_PRODUCT_LIMIT);
        let products = self.products().list(limit).await?;

        if products.is_empty() {
            return Ok(Outcome::Done(ChatReply::text(
                "Your store doesn't have any products yet. \
                 Want me to help you add some? Just send me a list!",
            )));
        }

        let lines: Vec<String> = products
            .iter()
            .map(|p| format!("• **{}** — {}{}", p.name, p.price, stock_note(p.stock_level())))
            .collect();
        let content = format!(
            "Here are your {} product(s):\n\n{}\n\nWant me to update any of these or add new ones?",
            products.len(),
            lines.join("\n")
        );

        Ok(Outcome::Done(
            ChatReply::text(content).with_widget(Widget::ProductList { products }),
        ))
    }

    async fn add_products(&self, args: AddProducts, message: &str) -> HandlerResult {
        let text = args
            .product_list_text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| message.to_owned());

        let products = extract_products(self.model, &text).await;
        if products.is_empty() {
            return Ok(Outcome::Clarify(PRODUCT_FORMAT_HINT.to_owned()));
        }

        let count = self.products().create_bulk(&products).await?;
        info!(count, parsed = products.len(), "Products imported from chat");

        Ok(Outcome::Done(
            ChatReply::text(format!(
                "Done! I've added **{count} product(s)** to your store. 🎉\n\n\
                 Want me to write product descriptions for any of them?"
            ))
            .with_steps(&[
                "Reading your product list",
                "Extracting product details",
                "Saving to your store",
            ])
            .with_widget(Widget::ProductImport { count, products }),
        ))
    }

    async fn update_product_stock(&self, args: UpdateProductStock) -> HandlerResult {
        let name = args.product_name.trim();
        if name.is_empty() {
            return Ok(Outcome::Clarify(
                "Which product should I update? Tell me its name and the new quantity.".to_owned(),
            ));
        }
        let Some(quantity) = args.new_quantity else {
            return Ok(Outcome::Clarify(format!(
                "How many units of '{name}' do you have now?"
            )));
        };
        if quantity < 0 {
            return Ok(Outcome::Clarify(
                "Stock can't go below zero. What's the actual quantity on hand?".to_owned(),
            ));
        }

        let repo = self.products();
        let Some(product) = repo.find_by_name(name).await? else {
            return Ok(Outcome::Clarify(format!(
                "I couldn't find a product called '{name}'. Can you check the name and try again?"
            )));
        };

        let updated = repo.update(product.id, &ProductUpdate::stock(quantity)).await?;
        Ok(Outcome::Done(ChatReply::text(format!(
            "Done! I've updated **{}** stock to **{quantity} units**. ✅",
            updated.name
        ))))
    }

    async fn list_orders(&self, args: ListArgs) -> HandlerResult {
        let limit = clamp_limit(args.limit, DEFAULT_ORDER_LIMIT);
        let orders = OrderRepository::new(self.pool, self.tenant).list(limit).await?;

        if orders.is_empty() {
            return Ok(Outcome::Done(ChatReply::text(
                "No orders yet. Once customers start buying, I'll track everything here for you.",
            )));
        }

        let lines: Vec<String> = orders
            .iter()
            .map(|o| {
                format!(
                    "• **{}** — {} [{}]",
                    o.customer_label().unwrap_or("Unknown"),
                    o.total_amount,
                    o.status.to_uppercase()
                )
            })
            .collect();
        let content = format!(
            "Here are your last {} order(s):\n\n{}\n\nWant me to update any order status?",
            orders.len(),
            lines.join("\n")
        );

        Ok(Outcome::Done(
            ChatReply::text(content).with_widget(Widget::OrderList { orders }),
        ))
    }

    async fn update_order_status(&self, args: UpdateOrderStatus) -> HandlerResult {
        let reference = args.order_id.trim();
        if reference.is_empty() {
            return Ok(Outcome::Clarify(
                "Which order should I update? Send me the order number.".to_owned(),
            ));
        }
        let Ok(status) = args.status.parse::<OrderStatus>() else {
            let allowed: Vec<&str> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
            return Ok(Outcome::Clarify(format!(
                "'{}' isn't a status I can set. Use one of: {}.",
                args.status.trim(),
                allowed.join(", ")
            )));
        };

        match OrderRepository::new(self.pool, self.tenant)
            .update_status(reference, status)
            .await
        {
            Ok(order) => Ok(Outcome::Done(ChatReply::text(format!(
                "Done! Order for **{}** has been updated to **{}**. ✅",
                order.customer_label().unwrap_or("Customer"),
                status.as_str().to_uppercase()
            )))),
            Err(RepositoryError::NotFound) => Ok(Outcome::Clarify(format!(
                "I couldn't find order #{}. Can you double-check the order ID?",
                reference.trim_start_matches('#')
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_customers(&self, args: ListArgs) -> HandlerResult {
        let limit = clamp_limit(args.limit, DEFAULT_CUSTOMER_LIMIT);
        let customers = CustomerRepository::new(self.pool, self.tenant)
            .list(limit)
            .await?;

        if customers.is_empty() {
            return Ok(Outcome::Done(ChatReply::text(
                "No customers yet. They'll appear here once orders come in.",
            )));
        }

        let lines: Vec<String> = customers
            .iter()
            .map(|c| {
                format!(
                    "• **{}** — {} order(s), {} total",
                    c.display_name(),
                    c.orders_count,
                    c.lifetime_value
                )
            })
            .collect();
        let content = format!(
            "You have **{} customer(s)**:\n\n{}",
            customers.len(),
            lines.join("\n")
        );

        Ok(Outcome::Done(
            ChatReply::text(content).with_widget(Widget::CustomerList { customers }),
        ))
    }

    async fn create_invoice(&self, args: CreateInvoice) -> HandlerResult {
        let customer = non_blank(args.customer_name).unwrap_or_else(|| "Customer".to_owned());
        let total = args
            .amount
            .and_then(Money::from_f64)
            .unwrap_or_default();
        let items = non_blank(args.items).unwrap_or_else(|| "Services".to_owned());

        let now = Utc::now();
        let invoice_id = format!("INV-{}", now.timestamp());
        let settings = StoreSettingsRepository::new(self.pool)
            .find(self.tenant)
            .await?;
        let store_name = settings
            .as_ref()
            .map_or(DEFAULT_STORE_NAME, |s| s.store_name_or_default());

        let invoice = InvoiceTemplate {
            invoice_id: &invoice_id,
            issued_on: now.format("%Y-%m-%d").to_string(),
            store_name,
            customer: &customer,
            lines: invoice_lines(&items, total),
            total,
        }
        .render()?;

        info!(invoice_id = %invoice_id, total = %total, "Invoice generated");
        Ok(Outcome::Done(
            ChatReply::text(format!(
                "Invoice **#{invoice_id}** for **{customer}** totalling **{total}** is ready. ✅"
            ))
            .with_steps(&["Calculating totals", "Generating invoice", "Saving to your store"])
            .with_widget(Widget::Invoice {
                title: format!("Invoice #{invoice_id}"),
                description: format!("Billed to {customer}"),
                total,
                content: invoice,
            }),
        ))
    }

    async fn setup_store(&self, args: SetupStore) -> HandlerResult {
        let business_name =
            non_blank(args.business_name).unwrap_or_else(|| DEFAULT_STORE_NAME.to_owned());
        let niche = non_blank(args.niche).unwrap_or_else(|| DEFAULT_NICHE.to_owned());

        let brand = creative::design_brand(self.model, &business_name, &niche).await;
        let copy = creative::write_storefront_copy(self.model, &business_name, &niche, &brand).await;

        if let Some(tenant) = self.tenant {
            let update = StoreSettingsUpdate {
                store_name: Some(business_name.clone()),
                store_domain: Some(business_name.to_lowercase().replace(' ', "-")),
                niche: Some(niche.clone()),
                primary_color: Some(brand.primary_color.clone()),
                heading_font: Some(brand.heading_font.clone()),
                body_font: Some(brand.body_font.clone()),
                hero_title: Some(copy.hero_title.clone()),
                hero_description: Some(copy.hero_description.clone()),
                footer_description: Some(copy.footer_description.clone()),
                hero_image: None,
                onboarding_completed: Some(true),
            };
            StoreSettingsRepository::new(self.pool)
                .upsert(tenant, &update)
                .await?;
        }

        let content = format!(
            "Your store **{business_name}** is live! 🎉\n\n\
             _{}_\n\n\
             I've set up your branding, colors, and copy based on your {niche} niche.\n\n\
             **Next steps:**\n\
             1. Add your products — just send me a list\n\
             2. Preview your store at your store URL\n\
             3. Connect a payment provider to start accepting payments\n\n\
             What would you like to do first?",
            brand.tagline
        );

        Ok(Outcome::Done(
            ChatReply::text(content)
                .with_steps(&[
                    "Understanding your business",
                    "Designing your brand identity",
                    "Writing your store copy",
                    "Building your storefront",
                ])
                .with_widget(Widget::StorePreview {
                    store_name: Some(business_name),
                    branding: Branding {
                        primary_color: Some(brand.primary_color),
                        heading_font: Some(brand.heading_font),
                        body_font: Some(brand.body_font),
                        tagline: Some(brand.tagline),
                        hero_image: None,
                    },
                    copy: Some(copy),
                }),
        ))
    }

    async fn customize_branding(&self, args: CustomizeBranding) -> HandlerResult {
        let update = StoreSettingsUpdate {
            primary_color: non_blank(args.primary_color),
            heading_font: non_blank(args.heading_font),
            body_font: non_blank(args.body_font),
            hero_image: non_blank(args.hero_image_url),
            ..StoreSettingsUpdate::default()
        };

        let changed = update.changed_fields();
        if changed.is_empty() {
            return Ok(Outcome::Clarify(
                "What would you like to change? I can update your primary color, \
                 heading font, body font, or hero image."
                    .to_owned(),
            ));
        }

        if let Some(tenant) = self.tenant {
            StoreSettingsRepository::new(self.pool)
                .upsert(tenant, &update)
                .await?;
        }

        let changes: Vec<String> = changed.iter().map(|field| title_case(field)).collect();
        Ok(Outcome::Done(
            ChatReply::text(format!(
                "Done! I've updated your store's **{}**. The changes are live on your storefront. ✅",
                changes.join(", ")
            ))
            .with_widget(Widget::StorePreview {
                store_name: None,
                branding: Branding {
                    primary_color: update.primary_color,
                    heading_font: update.heading_font,
                    body_font: update.body_font,
                    tagline: None,
                    hero_image: update.hero_image,
                },
                copy: None,
            }),
        ))
    }

    async fn create_document(
        &self,
        args: CreateDocument,
        message: &str,
        snapshot: &str,
    ) -> HandlerResult {
        let doc_type = non_blank(args.doc_type).unwrap_or_else(|| "policy".to_owned());
        let details = non_blank(args.details).unwrap_or_else(|| message.to_owned());
        let title = title_case(&doc_type);

        let content = creative::draft_document(self.model, &doc_type, &details, Some(snapshot)).await;

        Ok(Outcome::Done(
            ChatReply::text(format!(
                "I've drafted your **{title}**. Review it below and let me know if you need changes."
            ))
            .with_steps(&["Analysing your business", "Drafting document", "Polishing final text"])
            .with_widget(Widget::Document {
                title,
                content,
                actions: vec!["download", "copy", "edit"],
            }),
        ))
    }
}

fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_LIST_LIMIT)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// Chat suffix for a product line, e.g. ` ⚠️ [LOW: 5 left]`.
#[must_use]
pub fn stock_note(level: StockLevel) -> String {
    match level {
        StockLevel::OutOfStock => format!(" 🚨 {}", level.note()),
        StockLevel::Low(_) => format!(" ⚠️ {}", level.note()),
        StockLevel::InStock(_) => format!(" {}", level.note()),
    }
}

/// One line per comma-separated item. The first carries the whole amount.
fn invoice_lines(items: &str, total: Money) -> Vec<String> {
    items
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .enumerate()
        .map(|(i, item)| {
            let price = if i == 0 { total } else { Money::ZERO };
            format!("{item:<32} {price}")
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_note() {
        assert_eq!(stock_note(StockLevel::classify(0)), " 🚨 [OUT OF STOCK]");
        assert_eq!(stock_note(StockLevel::classify(5)), " ⚠️ [LOW: 5 left]");
        assert_eq!(stock_note(StockLevel::classify(30)), " [Stock: 30]");
    }

    #[test]
    fn test_invoice_lines_put_total_on_first_item() {
        let total = Money::parse("45000").unwrap();
        let lines = invoice_lines("Ankara Tote, Delivery ,", total);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Ankara Tote"));
        assert!(lines[0].ends_with("₦45,000.00"));
        assert!(lines[1].ends_with("₦0.00"));
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 20), 20);
        assert_eq!(clamp_limit(Some(0), 20), 1);
        assert_eq!(clamp_limit(Some(10_000), 20), MAX_LIST_LIMIT);
    }

    #[test]
    fn test_outcome_unwrap_or_else() {
        let done: Outcome<&str> = Outcome::Done("ok");
        assert_eq!(done.unwrap_or_else(|_| "asked"), "ok");
        let clarify: Outcome<&str> = Outcome::Clarify("which one?".to_owned());
        assert_eq!(clarify.unwrap_or_else(|_| "asked"), "asked");
    }
}

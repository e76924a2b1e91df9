//! The chat assistant end to end, with a scripted language model.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{Duration, Utc};
use serde_json::json;

use mona_core::{Email, Severity};
use mona_engine::assistant::actions::{CustomizeBranding, UpdateOrderStatus, UpdateProductStock};
use mona_engine::assistant::router::{MODEL_FAILURE_REPLY, NO_MODEL_REPLY};
use mona_engine::assistant::{Action, Assistant, ChatReply, Dispatcher, Outcome};
use mona_engine::db::{CustomerRepository, OrderRepository, ProductRepository, StoreSettingsRepository};
use mona_engine::intelligence::{Alert, AlertKind};
use mona_engine::llm::{Completion, LlmError};
use mona_engine::models::{NewCustomer, NewOrder};
use mona_engine::services::NotificationService;
use mona_integration_tests::{ScriptedModel, add_product, memory_pool, naira, tenant};

async fn add_customer(
    pool: &sqlx::SqlitePool,
    user: &str,
    name: &str,
    email: &str,
    lifetime_value: &str,
) -> mona_engine::models::Customer {
    CustomerRepository::new(pool, Some(&tenant(user)))
        .upsert(&NewCustomer {
            full_name: Some(name.to_owned()),
            lifetime_value: Some(naira(lifetime_value)),
            ..NewCustomer::new(Email::parse(email).unwrap())
        })
        .await
        .unwrap()
}

async fn add_order(
    pool: &sqlx::SqlitePool,
    user: &str,
    customer: &mona_engine::models::Customer,
    amount: &str,
    status: &str,
    days_ago: i64,
) {
    OrderRepository::new(pool, Some(&tenant(user)))
        .create(&NewOrder {
            external_id: None,
            customer_id: Some(customer.id),
            store_id: None,
            total_amount: naira(amount),
            status: status.to_owned(),
            platform: None,
            created_at: Some(Utc::now() - Duration::days(days_ago)),
        })
        .await
        .unwrap();
}

async fn ask(pool: &sqlx::SqlitePool, model: &ScriptedModel, user: &str, message: &str) -> ChatReply {
    let notifications = NotificationService::new(20);
    let merchant = tenant(user);
    Assistant::new(pool, model, &notifications)
        .handle(message, Some(&merchant))
        .await
}

#[tokio::test]
async fn test_list_products_flags_low_stock() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    add_product(&pool, &merchant, "Red Cap", "5000", 5).await;
    add_product(&pool, &merchant, "Blue Hat", "7000", 40).await;
    let model = ScriptedModel::new([Completion::tool("list_products", json!({}))]);

    let reply = ask(&pool, &model, "merchant-1", "show my products").await;

    assert_eq!(reply.tool.as_deref(), Some("list_products"));
    assert!(reply.content.contains("Here are your 2 product(s)"));
    assert!(reply.content.contains("**Red Cap** — ₦5,000.00 ⚠️ [LOW: 5 left]"));
    assert!(reply.content.contains("[Stock: 40]"));

    let body = serde_json::to_value(&reply).unwrap();
    assert_eq!(body["widget"]["type"], "product_list");
    assert_eq!(body["widget"]["products"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_router_sees_the_snapshot() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    add_product(&pool, &merchant, "Red Cap", "5000", 5).await;
    let model = ScriptedModel::new([Completion::text("You have one product.")]);

    let reply = ask(&pool, &model, "merchant-1", "how is my store?").await;

    assert_eq!(reply.content, "You have one product.");
    assert!(reply.tool.is_none());
    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    let system = &requests[0].messages[0].content;
    assert!(system.starts_with("### LIVE BUSINESS SNAPSHOT"));
    assert!(system.contains("Red Cap"));
    assert!(!requests[0].tools.is_empty());
}

#[tokio::test]
async fn test_update_stock_through_chat() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    add_product(&pool, &merchant, "Red Cap", "5000", 5).await;
    let model = ScriptedModel::new([Completion::tool(
        "update_product_stock",
        json!({"product_name": "red cap", "new_quantity": "40"}),
    )]);

    let reply = ask(&pool, &model, "merchant-1", "I now have 40 red caps").await;

    assert_eq!(reply.content, "Done! I've updated **Red Cap** stock to **40 units**. ✅");
    let product = ProductRepository::new(&pool, Some(&merchant))
        .find_by_name("Red Cap")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock_quantity, 40);
}

#[tokio::test]
async fn test_unknown_product_asks_for_clarification() {
    let pool = memory_pool().await;
    let model = ScriptedModel::offline();
    let merchant = tenant("merchant-1");

    let outcome = Dispatcher::new(&pool, &model, Some(&merchant))
        .dispatch(
            Action::UpdateProductStock(UpdateProductStock {
                product_name: "Blue Hat".to_owned(),
                new_quantity: Some(3),
            }),
            "set blue hat to 3",
            "",
            "",
        )
        .await
        .unwrap();

    let Outcome::Clarify(message) = outcome else {
        panic!("expected a clarification");
    };
    assert_eq!(
        message,
        "I couldn't find a product called 'Blue Hat'. Can you check the name and try again?"
    );
}

#[tokio::test]
async fn test_invalid_order_status_lists_allowed_values() {
    let pool = memory_pool().await;
    let model = ScriptedModel::offline();

    let outcome = Dispatcher::new(&pool, &model, None)
        .dispatch(
            Action::UpdateOrderStatus(UpdateOrderStatus {
                order_id: "1042".to_owned(),
                status: "lost".to_owned(),
            }),
            "",
            "",
            "",
        )
        .await
        .unwrap();

    let Outcome::Clarify(message) = outcome else {
        panic!("expected a clarification");
    };
    assert!(message.ends_with("Use one of: pending, processing, shipped, delivered, cancelled."));
}

#[tokio::test]
async fn test_update_order_status_through_chat() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let customer = CustomerRepository::new(&pool, Some(&merchant))
        .upsert(&NewCustomer {
            full_name: Some("Amaka Eze".to_owned()),
            ..NewCustomer::new(Email::parse("amaka@example.com").unwrap())
        })
        .await
        .unwrap();
    OrderRepository::new(&pool, Some(&merchant))
        .create(&NewOrder {
            external_id: Some("1042".to_owned()),
            customer_id: Some(customer.id),
            store_id: None,
            total_amount: naira("23500"),
            status: "pending".to_owned(),
            platform: None,
            created_at: None,
        })
        .await
        .unwrap();
    let model = ScriptedModel::new([Completion::tool(
        "update_order_status",
        json!({"order_id": 1042, "status": "Shipped"}),
    )]);

    let reply = ask(&pool, &model, "merchant-1", "mark order 1042 as shipped").await;

    assert_eq!(
        reply.content,
        "Done! Order for **Amaka Eze** has been updated to **SHIPPED**. ✅"
    );
}

#[tokio::test]
async fn test_add_products_from_free_text() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let model = ScriptedModel::new([
        Completion::tool(
            "add_products",
            json!({"product_list_text": "Black Sneakers ₦15,000 stock 20\nWhite Tee ₦5,000 stock 50"}),
        ),
        Completion::text(
            r#"Here you go: [{"name": "Black Sneakers", "price": 15000, "stock_quantity": 20},
                {"name": "White Tee", "price": "5000", "stock": "50"}]"#,
        ),
    ]);

    let reply = ask(&pool, &model, "merchant-1", "add these").await;

    assert!(reply.content.starts_with("Done! I've added **2 product(s)**"));
    assert_eq!(reply.steps.len(), 3);
    let products = ProductRepository::new(&pool, Some(&merchant));
    assert_eq!(products.count().await.unwrap(), 2);
    let tee = products.find_by_name("White Tee").await.unwrap().unwrap();
    assert_eq!(tee.price, naira("5000"));
    assert_eq!(tee.stock_quantity, 50);
}

#[tokio::test]
async fn test_unparseable_product_list_asks_for_format() {
    let pool = memory_pool().await;
    let model = ScriptedModel::new([
        Completion::tool("add_products", json!({})),
        Completion::text("I am not sure what you mean."),
    ]);

    let reply = ask(&pool, &model, "merchant-1", "add my stuff").await;

    assert!(reply.content.starts_with("I couldn't read a clear product list from that."));
    assert_eq!(reply.tool.as_deref(), Some("add_products"));
}

#[tokio::test]
async fn test_invoice_uses_store_name_and_amount() {
    let pool = memory_pool().await;
    let model = ScriptedModel::new([Completion::tool(
        "create_invoice",
        json!({"customer_name": "Amaka", "amount": 45000, "items": "Ankara Tote, Delivery"}),
    )]);

    let reply = ask(&pool, &model, "merchant-1", "invoice Amaka 45k").await;

    assert!(reply.content.contains("for **Amaka** totalling **₦45,000.00** is ready"));
    let body = serde_json::to_value(&reply).unwrap();
    assert_eq!(body["widget"]["type"], "invoice");
    assert_eq!(body["widget"]["total"], json!(45000.0));
    assert!(body["widget"]["content"].as_str().unwrap().contains("Ankara Tote"));
}

#[tokio::test]
async fn test_setup_store_persists_settings_with_fallback_branding() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    // Brand and copy calls find the script exhausted and fall back
    let model = ScriptedModel::new([Completion::tool(
        "setup_store",
        json!({"business_name": "Glow Naturals", "niche": "beauty"}),
    )]);

    let reply = ask(&pool, &model, "merchant-1", "set up my beauty store Glow Naturals").await;

    assert!(reply.content.starts_with("Your store **Glow Naturals** is live! 🎉"));
    let settings = StoreSettingsRepository::new(&pool)
        .find(Some(&merchant))
        .await
        .unwrap()
        .unwrap();
    assert!(settings.onboarding_completed);
    assert_eq!(settings.niche.as_deref(), Some("beauty"));
    assert!(settings.primary_color.is_some());
    assert!(settings.hero_title.is_some());
}

#[tokio::test]
async fn test_customize_branding_without_changes_asks() {
    let pool = memory_pool().await;
    let model = ScriptedModel::offline();

    let outcome = Dispatcher::new(&pool, &model, None)
        .dispatch(
            Action::CustomizeBranding(CustomizeBranding::default()),
            "change my branding",
            "",
            "",
        )
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Clarify(_)));
}

#[tokio::test]
async fn test_unknown_tool_returns_model_text() {
    let pool = memory_pool().await;
    let model = ScriptedModel::new([Completion {
        content: Some("Let me think about refunds.".to_owned()),
        ..Completion::tool("issue_refund", json!({}))
    }]);

    let reply = ask(&pool, &model, "merchant-1", "refund order 12").await;

    assert_eq!(reply.content, "Let me think about refunds.");
    assert_eq!(reply.tool.as_deref(), Some("issue_refund"));
}

#[tokio::test]
async fn test_offline_model_replies_with_configuration_hint() {
    let pool = memory_pool().await;
    let model = ScriptedModel::offline();

    let reply = ask(&pool, &model, "merchant-1", "hello").await;

    assert_eq!(reply.content, NO_MODEL_REPLY);
    assert!(reply.tool.is_none());
    assert!(reply.widget.is_none());
}

#[tokio::test]
async fn test_model_failure_replies_with_apology() {
    let pool = memory_pool().await;
    let model = ScriptedModel::new([]).then_fail(LlmError::EmptyResponse);

    let reply = ask(&pool, &model, "merchant-1", "hello").await;

    assert_eq!(reply.content, MODEL_FAILURE_REPLY);
}

#[tokio::test]
async fn test_queued_notifications_ride_along_with_the_reply() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    let notifications = NotificationService::new(20);
    notifications.enqueue(
        &merchant,
        Alert::new(
            AlertKind::LowStock,
            Severity::High,
            "⚠️ Red Cap is running low — only 5 left.",
            "Restock Red Cap",
        ),
    );
    let model = ScriptedModel::new([Completion::text("Hi!")]);

    let reply = Assistant::new(&pool, &model, &notifications)
        .handle("hi", Some(&merchant))
        .await;

    assert_eq!(reply.notifications.len(), 1);
    assert_eq!(reply.notifications[0].kind, AlertKind::LowStock);
    assert_eq!(notifications.pending(&merchant), 0);
}

#[tokio::test]
async fn test_list_orders_on_empty_store() {
    let pool = memory_pool().await;
    let model = ScriptedModel::new([Completion::tool("list_orders", json!({}))]);

    let reply = ask(&pool, &model, "merchant-1", "show my orders").await;

    assert_eq!(reply.tool.as_deref(), Some("list_orders"));
    assert_eq!(
        reply.content,
        "No orders yet. Once customers start buying, I'll track everything here for you."
    );
    assert!(reply.widget.is_none());
}

#[tokio::test]
async fn test_list_orders_newest_first_with_status() {
    let pool = memory_pool().await;
    let amaka = add_customer(&pool, "merchant-1", "Amaka Eze", "amaka@example.com", "23500").await;
    let tunde = add_customer(&pool, "merchant-1", "Tunde Bello", "tunde@example.com", "8000").await;
    add_order(&pool, "merchant-1", &amaka, "23500", "delivered", 2).await;
    add_order(&pool, "merchant-1", &tunde, "8000", "pending", 0).await;
    // Another merchant's order stays out of the list
    let other = add_customer(&pool, "merchant-2", "Ngozi", "ngozi@example.com", "1000").await;
    add_order(&pool, "merchant-2", &other, "1000", "pending", 0).await;
    let model = ScriptedModel::new([Completion::tool("list_orders", json!({"limit": "10"}))]);

    let reply = ask(&pool, &model, "merchant-1", "what are my latest orders?").await;

    assert_eq!(
        reply.content,
        "Here are your last 2 order(s):\n\n\
         • **Tunde Bello** — ₦8,000.00 [PENDING]\n\
         • **Amaka Eze** — ₦23,500.00 [DELIVERED]\n\n\
         Want me to update any order status?"
    );
    let body = serde_json::to_value(&reply).unwrap();
    assert_eq!(body["widget"]["type"], "order_list");
    assert_eq!(body["widget"]["orders"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_customers_on_empty_store() {
    let pool = memory_pool().await;
    let model = ScriptedModel::new([Completion::tool("list_customers", json!({}))]);

    let reply = ask(&pool, &model, "merchant-1", "who are my customers?").await;

    assert_eq!(
        reply.content,
        "No customers yet. They'll appear here once orders come in."
    );
    assert!(reply.widget.is_none());
}

#[tokio::test]
async fn test_list_customers_with_order_counts() {
    let pool = memory_pool().await;
    let amaka = add_customer(&pool, "merchant-1", "Amaka Eze", "amaka@example.com", "31500").await;
    add_order(&pool, "merchant-1", &amaka, "23500", "delivered", 3).await;
    add_order(&pool, "merchant-1", &amaka, "8000", "pending", 1).await;
    let model = ScriptedModel::new([Completion::tool("list_customers", json!({}))]);

    let reply = ask(&pool, &model, "merchant-1", "list my customers").await;

    assert_eq!(
        reply.content,
        "You have **1 customer(s)**:\n\n• **Amaka Eze** — 2 order(s), ₦31,500.00 total"
    );
    let body = serde_json::to_value(&reply).unwrap();
    assert_eq!(body["widget"]["type"], "customer_list");
    assert_eq!(body["widget"]["customers"][0]["orders_count"], 2);
}

#[tokio::test]
async fn test_create_document_returns_draft() {
    let pool = memory_pool().await;
    let model = ScriptedModel::new([
        Completion::tool(
            "create_document",
            json!({"doc_type": "refund_policy", "details": "refunds within 7 days"}),
        ),
        Completion::text("Refunds are accepted within 7 days of delivery."),
    ]);

    let reply = ask(&pool, &model, "merchant-1", "write me a refund policy").await;

    assert_eq!(
        reply.content,
        "I've drafted your **Refund Policy**. Review it below and let me know if you need changes."
    );
    assert_eq!(reply.steps.len(), 3);
    let body = serde_json::to_value(&reply).unwrap();
    assert_eq!(body["widget"]["type"], "document");
    assert_eq!(body["widget"]["title"], "Refund Policy");
    assert_eq!(
        body["widget"]["content"],
        "Refunds are accepted within 7 days of delivery."
    );
    assert_eq!(body["widget"]["actions"], json!(["download", "copy", "edit"]));

    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    assert!(
        requests[1]
            .messages
            .iter()
            .any(|m| m.content.contains("refund policy") && m.content.contains("refunds within 7 days"))
    );
}

#[tokio::test]
async fn test_create_document_defaults_and_fallback() {
    let pool = memory_pool().await;
    // The drafting call finds the script exhausted
    let model = ScriptedModel::new([Completion::tool("create_document", json!({}))]);

    let reply = ask(&pool, &model, "merchant-1", "I need a shipping notice").await;

    let body = serde_json::to_value(&reply).unwrap();
    assert_eq!(body["widget"]["title"], "Policy");
    assert_eq!(
        body["widget"]["content"],
        "I couldn't generate the Policy right now. Please try again."
    );
    let requests = model.requests();
    assert!(
        requests[1]
            .messages
            .iter()
            .any(|m| m.content.contains("I need a shipping notice"))
    );
}

#[tokio::test]
async fn test_customize_branding_updates_only_given_fields() {
    let pool = memory_pool().await;
    let merchant = tenant("merchant-1");
    StoreSettingsRepository::new(&pool)
        .upsert(
            &merchant,
            &mona_engine::models::StoreSettingsUpdate {
                store_name: Some("Glow Naturals".to_owned()),
                body_font: Some("Inter".to_owned()),
                ..mona_engine::models::StoreSettingsUpdate::default()
            },
        )
        .await
        .unwrap();
    let model = ScriptedModel::new([Completion::tool(
        "customize_branding",
        json!({"primary_color": "#0F766E", "heading_font": "Playfair Display", "body_font": "  "}),
    )]);

    let reply = ask(&pool, &model, "merchant-1", "make it teal with Playfair headings").await;

    assert_eq!(
        reply.content,
        "Done! I've updated your store's **Primary Color, Heading Font**. \
         The changes are live on your storefront. ✅"
    );
    let body = serde_json::to_value(&reply).unwrap();
    assert_eq!(body["widget"]["type"], "store_preview");
    assert_eq!(
        body["widget"]["branding"],
        json!({"primary_color": "#0F766E", "heading_font": "Playfair Display"})
    );

    let settings = StoreSettingsRepository::new(&pool)
        .find(Some(&merchant))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settings.primary_color.as_deref(), Some("#0F766E"));
    assert_eq!(settings.heading_font.as_deref(), Some("Playfair Display"));
    assert_eq!(settings.body_font.as_deref(), Some("Inter"));
    assert_eq!(settings.store_name.as_deref(), Some("Glow Naturals"));
}

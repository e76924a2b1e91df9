//! Tool definitions offered to the assistant model.
//!
//! Each tool corresponds to one [`crate::assistant::Action`] variant; the
//! argument names here are the keys the action parser reads.

use serde_json::json;

use super::types::ToolDefinition;

pub const LIST_PRODUCTS: &str = "list_products";
pub const ADD_PRODUCTS: &str = "add_products";
pub const UPDATE_PRODUCT_STOCK: &str = "update_product_stock";
pub const LIST_ORDERS: &str = "list_orders";
pub const UPDATE_ORDER_STATUS: &str = "update_order_status";
pub const LIST_CUSTOMERS: &str = "list_customers";
pub const CREATE_INVOICE: &str = "create_invoice";
pub const SETUP_STORE: &str = "setup_store";
pub const CUSTOMIZE_BRANDING: &str = "customize_branding";
pub const CREATE_DOCUMENT: &str = "create_document";

/// Every tool the assistant may call.
#[must_use]
pub fn assistant_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: LIST_PRODUCTS,
            description: "List, show, or count the products currently in the store. Use for \
                          'list my products', 'what products do I have', 'show inventory'.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "description": "Maximum products to show (default 50)" }
                }
            }),
        },
        ToolDefinition {
            name: ADD_PRODUCTS,
            description: "Import NEW products the merchant is providing as text. Use only when \
                          the merchant is giving you products to add, never to list existing ones.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "product_list_text": {
                        "type": "string",
                        "description": "The raw text containing product names, prices, and details"
                    }
                }
            }),
        },
        ToolDefinition {
            name: UPDATE_PRODUCT_STOCK,
            description: "Set the stock quantity of an existing product. Use for 'update stock \
                          for X', 'set X to Y units', 'restock X'.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "product_name": { "type": "string", "description": "Name of the product" },
                    "new_quantity": { "type": "integer", "description": "The new stock quantity" }
                },
                "required": ["product_name", "new_quantity"]
            }),
        },
        ToolDefinition {
            name: LIST_ORDERS,
            description: "Show the merchant's recent orders.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "description": "Maximum orders to show (default 20)" }
                }
            }),
        },
        ToolDefinition {
            name: UPDATE_ORDER_STATUS,
            description: "Change the status of an order, e.g. 'mark order X as shipped'.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "order_id": { "type": "string", "description": "The order ID or order number" },
                    "status": {
                        "type": "string",
                        "enum": ["pending", "processing", "shipped", "delivered", "cancelled"]
                    }
                },
                "required": ["order_id", "status"]
            }),
        },
        ToolDefinition {
            name: LIST_CUSTOMERS,
            description: "Show the merchant's customers.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "description": "Maximum customers to show (default 20)" }
                }
            }),
        },
        ToolDefinition {
            name: CREATE_INVOICE,
            description: "Generate an invoice for a customer.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "customer_name": { "type": "string" },
                    "amount": { "type": "number", "description": "Total amount in Naira" },
                    "items": { "type": "string", "description": "Comma-separated items or services" }
                },
                "required": ["amount"]
            }),
        },
        ToolDefinition {
            name: SETUP_STORE,
            description: "Set up a complete storefront for a new merchant. Use for 'set up my \
                          store', 'I want to start a store selling X'.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "business_name": { "type": "string" },
                    "niche": { "type": "string", "description": "What the business sells" }
                }
            }),
        },
        ToolDefinition {
            name: CUSTOMIZE_BRANDING,
            description: "Change the store's colors, fonts, or hero image.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "primary_color": { "type": "string", "description": "Hex color, e.g. '#FF5733'" },
                    "heading_font": { "type": "string" },
                    "body_font": { "type": "string" },
                    "hero_image_url": { "type": "string" }
                }
            }),
        },
        ToolDefinition {
            name: CREATE_DOCUMENT,
            description: "Draft a business document such as a refund policy, shipping policy, \
                          or terms and conditions.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "doc_type": { "type": "string", "description": "e.g. 'refund_policy', 'terms'" },
                    "details": { "type": "string", "description": "Specifics to include" }
                }
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_tool_names_unique() {
        let tools = assistant_tools();
        let names: HashSet<_> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(tools.len(), 10);
    }

    #[test]
    fn test_schemas_are_objects() {
        for tool in assistant_tools() {
            assert_eq!(tool.parameters["type"], "object", "{}", tool.name);
        }
    }
}

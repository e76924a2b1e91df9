//! The closed set of assistant actions and their arguments.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::llm::ToolCall;
use crate::llm::tools;

/// One merchant intent, parsed from the model's tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ListProducts(ListArgs),
    AddProducts(AddProducts),
    UpdateProductStock(UpdateProductStock),
    ListOrders(ListArgs),
    UpdateOrderStatus(UpdateOrderStatus),
    ListCustomers(ListArgs),
    CreateInvoice(CreateInvoice),
    SetupStore(SetupStore),
    CustomizeBranding(CustomizeBranding),
    CreateDocument(CreateDocument),
    /// A tool name outside the known set.
    Unknown(String),
}

impl Action {
    /// Parse a tool call.
    ///
    /// Arguments that fail to deserialize fall back to the payload's defaults,
    /// so a sloppy model reply still reaches a handler that can ask for what
    /// is missing.
    #[must_use]
    pub fn from_tool_call(call: &ToolCall) -> Self {
        let args = &call.arguments;
        match call.name.as_str() {
            tools::LIST_PRODUCTS => Self::ListProducts(payload(args)),
            tools::ADD_PRODUCTS => Self::AddProducts(payload(args)),
            tools::UPDATE_PRODUCT_STOCK => Self::UpdateProductStock(payload(args)),
            tools::LIST_ORDERS => Self::ListOrders(payload(args)),
            tools::UPDATE_ORDER_STATUS => Self::UpdateOrderStatus(payload(args)),
            tools::LIST_CUSTOMERS => Self::ListCustomers(payload(args)),
            tools::CREATE_INVOICE => Self::CreateInvoice(payload(args)),
            tools::SETUP_STORE => Self::SetupStore(payload(args)),
            tools::CUSTOMIZE_BRANDING => Self::CustomizeBranding(payload(args)),
            tools::CREATE_DOCUMENT => Self::CreateDocument(payload(args)),
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Tool name this action was parsed from.
    #[must_use]
    pub fn tool_name(&self) -> &str {
        match self {
            Self::ListProducts(_) => tools::LIST_PRODUCTS,
            Self::AddProducts(_) => tools::ADD_PRODUCTS,
            Self::UpdateProductStock(_) => tools::UPDATE_PRODUCT_STOCK,
            Self::ListOrders(_) => tools::LIST_ORDERS,
            Self::UpdateOrderStatus(_) => tools::UPDATE_ORDER_STATUS,
            Self::ListCustomers(_) => tools::LIST_CUSTOMERS,
            Self::CreateInvoice(_) => tools::CREATE_INVOICE,
            Self::SetupStore(_) => tools::SETUP_STORE,
            Self::CustomizeBranding(_) => tools::CUSTOMIZE_BRANDING,
            Self::CreateDocument(_) => tools::CREATE_DOCUMENT,
            Self::Unknown(name) => name,
        }
    }
}

fn payload<T>(args: &Value) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    T::deserialize(args).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Tool arguments did not match; using defaults");
        T::default()
    })
}

/// `limit` for the three list actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListArgs {
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddProducts {
    #[serde(default)]
    pub product_list_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateProductStock {
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub new_quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateOrderStatus {
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_id: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateInvoice {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub amount: Option<f64>,
    /// Comma-separated item names.
    #[serde(default)]
    pub items: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SetupStore {
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomizeBranding {
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub heading_font: Option<String>,
    #[serde(default)]
    pub body_font: Option<String>,
    #[serde(default)]
    pub hero_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateDocument {
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

// Models send numbers as strings often enough that strict typing loses intents.

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    })
}

fn lenient_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => mona_core::Money::parse(&s).map(|m| m.to_f64()),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_owned(),
            name: name.to_owned(),
            arguments,
        }
    }

    #[test]
    fn test_parse_known_tools() {
        let action = Action::from_tool_call(&call(
            "update_product_stock",
            json!({"product_name": "Shea Butter", "new_quantity": "25"}),
        ));
        assert_eq!(
            action,
            Action::UpdateProductStock(UpdateProductStock {
                product_name: "Shea Butter".to_owned(),
                new_quantity: Some(25),
            })
        );

        let action = Action::from_tool_call(&call(
            "update_order_status",
            json!({"order_id": 1042, "status": "shipped"}),
        ));
        let Action::UpdateOrderStatus(args) = action else {
            panic!("expected update_order_status");
        };
        assert_eq!(args.order_id, "1042");
    }

    #[test]
    fn test_unknown_tool() {
        let action = Action::from_tool_call(&call("launch_rocket", json!({})));
        assert_eq!(action, Action::Unknown("launch_rocket".to_owned()));
        assert_eq!(action.tool_name(), "launch_rocket");
    }

    #[test]
    fn test_bad_arguments_use_defaults() {
        let action = Action::from_tool_call(&call("list_orders", json!("not an object")));
        assert_eq!(action, Action::ListOrders(ListArgs::default()));
    }

    #[test]
    fn test_invoice_amount_from_string() {
        let action = Action::from_tool_call(&call(
            "create_invoice",
            json!({"customer_name": "Tunde", "amount": "₦45,000", "items": "Tote, Delivery"}),
        ));
        let Action::CreateInvoice(args) = action else {
            panic!("expected create_invoice");
        };
        assert_eq!(args.amount, Some(45_000.0));
    }

    #[test]
    fn test_tool_name_round_trip() {
        for name in crate::llm::tools::assistant_tools().iter().map(|tool| tool.name) {
            assert_eq!(Action::from_tool_call(&call(name, json!({}))).tool_name(), name);
        }
    }
}

//! What the chat endpoint sends back.

use serde::Serialize;

use mona_core::Money;

use crate::intelligence::Alert;
use crate::models::{Customer, NewProduct, Order, Product};
use crate::services::StorefrontCopy;

/// A chat response.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatReply {
    pub content: String,
    /// Tool the model chose, if any.
    pub tool: Option<String>,
    pub widget: Option<Widget>,
    /// Progress labels the UI plays back while rendering the reply.
    pub steps: Vec<&'static str>,
    pub notifications: Vec<Alert>,
}

impl ChatReply {
    /// A plain text reply.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_widget(mut self, widget: Widget) -> Self {
        self.widget = Some(widget);
        self
    }

    #[must_use]
    pub fn with_steps(mut self, steps: &[&'static str]) -> Self {
        self.steps = steps.to_vec();
        self
    }
}

/// Structured payload rendered next to the reply text.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Widget {
    ProductList {
        products: Vec<Product>,
    },
    ProductImport {
        count: usize,
        products: Vec<NewProduct>,
    },
    OrderList {
        orders: Vec<Order>,
    },
    CustomerList {
        customers: Vec<Customer>,
    },
    Invoice {
        title: String,
        description: String,
        total: Money,
        /// Rendered plain-text invoice.
        content: String,
    },
    StorePreview {
        #[serde(skip_serializing_if = "Option::is_none")]
        store_name: Option<String>,
        branding: Branding,
        #[serde(skip_serializing_if = "Option::is_none")]
        copy: Option<StorefrontCopy>,
    },
    Document {
        title: String,
        content: String,
        actions: Vec<&'static str>,
    },
}

/// Branding fields shown in a store preview. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Branding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
}

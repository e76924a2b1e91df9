//! Stock level classification.

use serde::Serialize;

/// Quantities strictly below this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// How a product's stock quantity reads to a merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "quantity", rename_all = "snake_case")]
pub enum StockLevel {
    /// Zero or negative quantity.
    OutOfStock,
    /// Between one and [`LOW_STOCK_THRESHOLD`] exclusive.
    Low(i64),
    /// Comfortably stocked.
    InStock(i64),
}

impl StockLevel {
    /// Classify a raw quantity.
    #[must_use]
    pub const fn classify(quantity: i64) -> Self {
        if quantity <= 0 {
            Self::OutOfStock
        } else if quantity < LOW_STOCK_THRESHOLD {
            Self::Low(quantity)
        } else {
            Self::InStock(quantity)
        }
    }

    /// Bracketed note appended to product lines, e.g. `[LOW: 5 left]`.
    #[must_use]
    pub fn note(&self) -> String {
        match self {
            Self::OutOfStock => "[OUT OF STOCK]".to_owned(),
            Self::Low(n) => format!("[LOW: {n} left]"),
            Self::InStock(n) => format!("[Stock: {n}]"),
        }
    }

    /// Whether the product needs restocking soon.
    #[must_use]
    pub const fn is_low(&self) -> bool {
        matches!(self, Self::Low(_))
    }

    /// Whether the product cannot be sold.
    #[must_use]
    pub const fn is_out(&self) -> bool {
        matches!(self, Self::OutOfStock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(StockLevel::classify(-3), StockLevel::OutOfStock);
        assert_eq!(StockLevel::classify(0), StockLevel::OutOfStock);
        assert_eq!(StockLevel::classify(1), StockLevel::Low(1));
        assert_eq!(StockLevel::classify(9), StockLevel::Low(9));
        assert_eq!(StockLevel::classify(10), StockLevel::InStock(10));
    }

    #[test]
    fn test_notes() {
        assert_eq!(StockLevel::classify(5).note(), "[LOW: 5 left]");
        assert_eq!(StockLevel::classify(0).note(), "[OUT OF STOCK]");
        assert_eq!(StockLevel::classify(40).note(), "[Stock: 40]");
    }
}

//! CSV ingestion for products and customers.
//!
//! Columns are located by header alias (case-insensitive). Rows that cannot
//! be converted are skipped and logged, never fatal.

use std::io::Cursor;

use csv::{StringRecord, Trim};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{instrument, warn};

use mona_core::{Email, Money, TenantId};

use crate::db::{CustomerRepository, ProductRepository, RepositoryError};
use crate::models::{NewCustomer, NewProduct};

/// Platform tag stamped on imported rows.
pub const CSV_PLATFORM: &str = "csv_import";

const NAME_ALIASES: &[&str] = &["name", "title", "product", "product_name", "product name"];
const PRICE_ALIASES: &[&str] = &["price", "amount", "unit_price", "unit price", "cost"];
const SKU_ALIASES: &[&str] = &["sku", "code", "product_code"];
const STOCK_ALIASES: &[&str] = &["stock_quantity", "stock", "quantity", "qty", "inventory"];
const DESCRIPTION_ALIASES: &[&str] = &["description", "details"];
const EMAIL_ALIASES: &[&str] = &["email", "email_address", "e-mail", "mail"];
const FULL_NAME_ALIASES: &[&str] = &["full_name", "name", "customer", "customer_name", "full name"];
const PHONE_ALIASES: &[&str] = &["phone", "phone_number", "mobile", "telephone"];

/// Errors that abort an import.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported import type: {0}")]
    UnknownKind(String),

    #[error("no column found for {0}")]
    MissingColumn(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What a CSV upload contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestKind {
    Products,
    Customers,
}

impl IngestKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Customers => "customers",
        }
    }
}

impl std::str::FromStr for IngestKind {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "products" | "product" => Ok(Self::Products),
            "customers" | "customer" => Ok(Self::Customers),
            other => Err(IngestError::UnknownKind(other.to_owned())),
        }
    }
}

fn reader(bytes: &[u8]) -> csv::Reader<Cursor<&[u8]>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(Cursor::new(bytes))
}

fn locate(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(alias))
    })
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Parse a product CSV. Rows without a name are dropped.
///
/// # Errors
///
/// Returns an error if the header row is unreadable or has no name column.
pub fn parse_products(bytes: &[u8]) -> Result<Vec<NewProduct>, IngestError> {
    let mut reader = reader(bytes);
    let headers = reader.headers()?.clone();
    let name = locate(&headers, NAME_ALIASES).ok_or(IngestError::MissingColumn("name"))?;
    let price = locate(&headers, PRICE_ALIASES);
    let sku = locate(&headers, SKU_ALIASES);
    let stock = locate(&headers, STOCK_ALIASES);
    let description = locate(&headers, DESCRIPTION_ALIASES);

    let mut products = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row_number = index + 2;
        let record = match row {
            Ok(record) => record,
            Err(e) => {
                warn!(row = row_number, error = %e, "Skipping unreadable CSV row");
                continue;
            }
        };

        let Some(product_name) = cell(&record, Some(name)) else {
            warn!(row = row_number, "Skipping CSV row without a product name");
            continue;
        };

        let stock_quantity = cell(&record, stock)
            .and_then(|raw| raw.parse::<f64>().ok())
            .map_or(0, |qty| qty as i64);

        products.push(NewProduct {
            name: product_name.to_owned(),
            description: cell(&record, description).map(str::to_owned),
            price: cell(&record, price).and_then(Money::parse).unwrap_or_default(),
            sku: cell(&record, sku).map(str::to_owned),
            stock_quantity,
            platform: Some(CSV_PLATFORM.to_owned()),
            ..NewProduct::default()
        });
    }

    Ok(products)
}

/// Parse a customer CSV. Rows without a valid email are dropped.
///
/// # Errors
///
/// Returns an error if the header row is unreadable or has no email column.
pub fn parse_customers(bytes: &[u8]) -> Result<Vec<NewCustomer>, IngestError> {
    let mut reader = reader(bytes);
    let headers = reader.headers()?.clone();
    let email = locate(&headers, EMAIL_ALIASES).ok_or(IngestError::MissingColumn("email"))?;
    let full_name = locate(&headers, FULL_NAME_ALIASES);
    let phone = locate(&headers, PHONE_ALIASES);

    let mut customers = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row_number = index + 2;
        let Ok(record) = row else {
            warn!(row = row_number, "Skipping unreadable CSV row");
            continue;
        };

        let parsed = cell(&record, Some(email)).map(Email::parse);
        let Some(Ok(address)) = parsed else {
            warn!(row = row_number, "Skipping CSV row without a valid email");
            continue;
        };

        customers.push(NewCustomer {
            full_name: cell(&record, full_name).map(str::to_owned),
            phone: cell(&record, phone).map(str::to_owned),
            platform: Some(CSV_PLATFORM.to_owned()),
            ..NewCustomer::new(address)
        });
    }

    Ok(customers)
}

/// Parse and store a CSV upload, returning the number of rows written.
///
/// # Errors
///
/// Returns an error if the CSV header is unusable, or
/// `IngestError::Repository` if the database fails outside of per-row
/// conflicts.
#[instrument(skip(pool, bytes), fields(user_id = ?tenant, kind = kind.as_str(), bytes = bytes.len()))]
pub async fn ingest_csv(
    pool: &SqlitePool,
    tenant: Option<&TenantId>,
    kind: IngestKind,
    bytes: &[u8],
) -> Result<usize, IngestError> {
    match kind {
        IngestKind::Products => {
            let products = parse_products(bytes)?;
            Ok(ProductRepository::new(pool, tenant)
                .create_bulk(&products)
                .await?)
        }
        IngestKind::Customers => {
            let repo = CustomerRepository::new(pool, tenant);
            let mut count = 0;
            for customer in parse_customers(bytes)? {
                match repo.upsert(&customer).await {
                    Ok(_) => count += 1,
                    Err(e @ (RepositoryError::Conflict(_) | RepositoryError::DataCorruption(_))) => {
                        warn!(email = %customer.email, error = %e, "Skipping customer row");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(count)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products_with_aliases() {
        let csv = b"Title,Unit Price,Qty,SKU\nAdire Scarf,\"12,000\",7,ADR-1\n,500,1,\nKente Cap,3500,,\n";
        let products = parse_products(csv).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Adire Scarf");
        assert_eq!(products[0].price, Money::parse("12000").unwrap());
        assert_eq!(products[0].stock_quantity, 7);
        assert_eq!(products[0].sku.as_deref(), Some("ADR-1"));
        assert_eq!(products[1].stock_quantity, 0);
        assert_eq!(products[1].platform.as_deref(), Some(CSV_PLATFORM));
    }

    #[test]
    fn test_parse_products_requires_name_column() {
        let result = parse_products(b"price,stock\n100,2\n");
        assert!(matches!(result, Err(IngestError::MissingColumn("name"))));
    }

    #[test]
    fn test_parse_customers_skips_bad_emails() {
        let csv = b"Email,Name,Phone\nAda@Shop.ng,Ada Obi,0801\nnot-an-email,Bad Row,\n";
        let customers = parse_customers(csv).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].email.as_str(), "ada@shop.ng");
        assert_eq!(customers[0].full_name.as_deref(), Some("Ada Obi"));
    }

    #[test]
    fn test_ingest_kind_parse() {
        assert_eq!("Products".parse::<IngestKind>().unwrap(), IngestKind::Products);
        assert!(matches!(
            "orders".parse::<IngestKind>(),
            Err(IngestError::UnknownKind(kind)) if kind == "orders"
        ));
    }
}

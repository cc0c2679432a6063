//! Wire payloads for the remote sale endpoint.
//!
//! Amounts cross the wire as decimal strings; minor-unit integers stay an
//! internal representation. Conversion happens here and nowhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kasa_core::{Money, TransactionLine, TransactionPayment, TransactionRecord};

// =============================================================================
// Request
// =============================================================================

/// A sale as submitted to the remote ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRequest {
    pub location_id: String,
    pub contact_id: String,
    pub transaction_date: DateTime<Utc>,
    /// Client-side invoice number; doubles as the idempotency key, so a
    /// replayed request cannot create a second remote sale.
    pub invoice_number: String,
    pub subtotal: String,
    pub discount: String,
    pub shipping: String,
    pub order_tax: String,
    pub total: String,
    pub lines: Vec<SaleLine>,
    pub payments: Vec<SalePayment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub variation_id: String,
    pub name: String,
    pub unit_price: String,
    /// Decimal quantity, e.g. `"1.5"`.
    pub quantity: String,
    pub discount: String,
    pub tax: String,
    pub line_total: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalePayment {
    pub method: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SaleRequest {
    /// Build the wire form of a committed transaction.
    pub fn from_record(
        record: &TransactionRecord,
        lines: &[TransactionLine],
        payments: &[TransactionPayment],
    ) -> Self {
        SaleRequest {
            location_id: record.location_id.clone(),
            contact_id: record.customer_id.clone(),
            transaction_date: record.created_at,
            invoice_number: record.invoice_number.clone(),
            subtotal: decimal(record.subtotal_minor),
            discount: decimal(record.discount_minor),
            shipping: decimal(record.shipping_minor),
            order_tax: decimal(record.order_tax_minor),
            total: decimal(record.total_minor),
            lines: lines
                .iter()
                .map(|line| SaleLine {
                    product_id: line.product_id.clone(),
                    variation_id: line.variation_id.clone(),
                    name: line.name.clone(),
                    unit_price: decimal(line.unit_price_minor),
                    quantity: line.quantity().to_string(),
                    discount: decimal(line.discount_minor),
                    tax: decimal(line.tax_minor),
                    line_total: decimal(line.line_total_minor),
                })
                .collect(),
            payments: payments
                .iter()
                .map(|payment| SalePayment {
                    method: method_name(payment),
                    amount: decimal(payment.amount_minor),
                    note: payment.note.clone(),
                })
                .collect(),
        }
    }
}

fn decimal(minor: i64) -> String {
    Money::from_minor(minor).to_decimal_string()
}

fn method_name(payment: &TransactionPayment) -> String {
    // serde's snake_case rendering, minus the JSON quotes
    serde_json::to_value(payment.method)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "other".to_string())
}

// =============================================================================
// Response
// =============================================================================

/// The remote ledger's acceptance of a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleResponse {
    /// Remote sale identifier.
    pub id: String,
    /// Where a hosted invoice can be viewed, if the server provides one.
    #[serde(default)]
    pub invoice_url: Option<String>,
}

/// Error body the server sends alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

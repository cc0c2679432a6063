//! Invoice number generation.

use chrono::Utc;
use uuid::Uuid;

/// Generates a unique invoice number: `INV-YYYYMMDD-XXXXXXXX`.
///
/// The random fragment makes the number collision-free without any
/// coordination, so offline terminals can issue invoices concurrently.
/// It also serves as the sync idempotency key.
pub fn generate_invoice_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let fragment = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("INV-{date}-{fragment}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_shape() {
        let number = generate_invoice_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_numbers_are_unique() {
        let a = generate_invoice_number();
        let b = generate_invoice_number();
        assert_ne!(a, b);
    }
}

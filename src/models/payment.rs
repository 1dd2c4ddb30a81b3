//! What a payer needs to complete a transfer.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Transfer details shown next to the QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PaymentInstructions {
    pub account_number: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub amount: u64,
    /// Must appear in the transfer narrative
    pub payment_code: String,
    /// VietQR image with account, amount and narrative prefilled
    pub qr_url: String,
}

/// Canonical form used to compare payment codes with bank narratives:
/// upper-cased with every whitespace character removed.
pub fn normalize_payment_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_all_whitespace() {
        assert_eq!(
            normalize_payment_text("  hoctuthien\tkichhoat\n ab12cd  "),
            "HOCTUTHIENKICHHOATAB12CD"
        );
    }

    #[test]
    fn test_normalize_vietnamese_uppercase() {
        assert_eq!(normalize_payment_text("ủng hộ"), "ỦNGHỘ");
    }
}

//! VietQR payment image links.

/// Build a VietQR image URL with account, amount and transfer content prefilled.
///
/// `https://img.vietqr.io/image/{bank}-{account}-{template}.png?amount=..&addInfo=..`
pub fn vietqr_url(bank_id: &str, template: &str, account: &str, amount: u64, content: &str) -> String {
    format!(
        "https://img.vietqr.io/image/{}-{}-{}.png?amount={}&addInfo={}",
        bank_id,
        account,
        template,
        amount,
        urlencoding::encode(content)
    )
}

//! Currency code to display symbol

/// Symbol used when a property's currency is unset or not recognised
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₦";

pub fn currency_symbol(code: Option<&str>) -> &'static str {
    let code = code.map(|c| c.trim().to_ascii_uppercase());
    match code.as_deref() {
        Some("USD") => "$",
        Some("NGN") => "₦",
        Some("EUR") => "€",
        Some("GBP") => "£",
        _ => DEFAULT_CURRENCY_SYMBOL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(currency_symbol(Some("USD")), "$");
        assert_eq!(currency_symbol(Some("ngn")), "₦");
        assert_eq!(currency_symbol(Some(" EUR ")), "€");
        assert_eq!(currency_symbol(Some("GBP")), "£");
    }

    #[test]
    fn test_unknown_or_missing_defaults_to_naira() {
        assert_eq!(currency_symbol(None), "₦");
        assert_eq!(currency_symbol(Some("")), "₦");
        assert_eq!(currency_symbol(Some("JPY")), "₦");
    }
}

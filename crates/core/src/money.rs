//! Rand amounts as shown to customers
//!
//! The backend reports every price in integer cents. Rendering follows the
//! South African convention: `R` prefix, space as thousands separator and a
//! comma before the cents.

/// Format an amount in cents as South African rand, e.g. `R 1 234,56`
#[must_use]
pub fn format_zar(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let rands = abs / 100;
    let remainder = abs % 100;

    format!("{sign}R {},{remainder:02}", group_thousands(rands))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_zar(0), "R 0,00");
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(format_zar(123_456), "R 1 234,56");
        assert_eq!(format_zar(100_000_000), "R 1 000 000,00");
        assert_eq!(format_zar(99_900), "R 999,00");
    }

    #[test]
    fn test_format_small_and_negative() {
        assert_eq!(format_zar(5), "R 0,05");
        assert_eq!(format_zar(-2_550), "-R 25,50");
    }
}

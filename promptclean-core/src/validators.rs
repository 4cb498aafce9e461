// File: promptclean-core/src/validators.rs
//! Programmatic validation for PII categories that have a checkable structure.
//!
//! These run only for rules with `programmatic_validation: true`. They reduce
//! false positives (order numbers that look like cards, dates that look like
//! SSNs) at the cost of letting malformed-but-real values through.
//!
//! License: MIT OR APACHE 2.0

/// Validates an SSN against the SSA structural rules.
///
/// # Arguments
///
/// * `ssn` - Expected format "XXX-XX-XXXX".
///
/// # Returns
///
/// `false` for area 000, 666 or 900-999, group 00, or serial 0000.
pub fn is_valid_ssn_programmatically(ssn: &str) -> bool {
    let mut parts = ssn.split('-');

    let (Some(area), Some(group), Some(serial), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    if area.len() != 3 || group.len() != 2 || serial.len() != 4 {
        return false;
    }

    let Ok(area_num) = area.parse::<u16>() else { return false; };
    let Ok(group_num) = group.parse::<u8>() else { return false; };
    let Ok(serial_num) = serial.parse::<u16>() else { return false; };

    let invalid_area = area_num == 0 || area_num == 666 || area_num >= 900;
    !(invalid_area || group_num == 0 || serial_num == 0)
}

/// Mod 10 checksum over a string of ASCII digits.
pub fn is_valid_luhn(num_str: &str) -> bool {
    let mut sum = 0;
    let mut alternate = false;

    for c in num_str.chars().rev() {
        let Some(mut digit) = c.to_digit(10) else { return false; };

        if alternate {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        alternate = !alternate;
    }

    sum % 10 == 0
}

/// Strips separators and applies the Luhn check.
pub fn is_valid_credit_card_programmatically(cc_number: &str) -> bool {
    let digits: String = cc_number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }
    is_valid_luhn(&digits)
}

/// Dispatches to the validator for a rule category. Categories without a
/// validator accept every match.
pub fn validate_for_category(category: &str, candidate: &str) -> bool {
    match category.to_ascii_uppercase().as_str() {
        "SSN" => is_valid_ssn_programmatically(candidate),
        "CREDIT_CARD" => is_valid_credit_card_programmatically(candidate),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssn_rules() {
        assert!(is_valid_ssn_programmatically("123-45-6789"));
        assert!(!is_valid_ssn_programmatically("000-45-6789"));
        assert!(!is_valid_ssn_programmatically("666-45-6789"));
        assert!(!is_valid_ssn_programmatically("912-45-6789"));
        assert!(!is_valid_ssn_programmatically("123-00-6789"));
        assert!(!is_valid_ssn_programmatically("123-45-0000"));
        assert!(!is_valid_ssn_programmatically("123456789"));
    }

    #[test]
    fn test_luhn() {
        assert!(is_valid_credit_card_programmatically("4111 1111 1111 1111"));
        assert!(is_valid_credit_card_programmatically("4111-1111-1111-1111"));
        assert!(!is_valid_credit_card_programmatically("4111 1111 1111 1112"));
        assert!(!is_valid_credit_card_programmatically("----"));
    }

    #[test]
    fn test_unknown_category_accepts() {
        assert!(validate_for_category("EMAIL", "anything"));
        assert!(!validate_for_category("credit_card", "1234 5678 9012 3456"));
    }
}

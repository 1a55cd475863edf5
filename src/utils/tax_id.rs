use crate::utils::constants::TAX_ID_LENGTH;

const FIRST_CHECK_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_CHECK_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Validate a 14-digit tax identifier (CNPJ) against its two modulo-11 check digits.
///
/// Formatting characters are ignored, so `11.222.333/0001-81` and
/// `11222333000181` are equivalent.
///
/// # Examples
/// ```
/// use ans_expenses::utils::is_valid_tax_id;
///
/// assert!(is_valid_tax_id("11.222.333/0001-81"));
/// assert!(!is_valid_tax_id("11222333000182"));
/// assert!(!is_valid_tax_id("00000000000000"));
/// ```
pub fn is_valid_tax_id(identifier: &str) -> bool {
    let digits: Vec<u32> = identifier.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != TAX_ID_LENGTH {
        return false;
    }

    // Repeated-digit sequences pass the checksum but are never issued
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    if check_digit(&digits[..12], &FIRST_CHECK_WEIGHTS) != digits[12] {
        return false;
    }

    check_digit(&digits[..13], &SECOND_CHECK_WEIGHTS) == digits[13]
}

/// Keep only the digits of a tax identifier.
pub fn normalize_tax_id(identifier: &str) -> String {
    identifier.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

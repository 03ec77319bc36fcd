//! Pure credential validators.
//!
//! Every function here is total: malformed input yields `false`, never a panic.
//! Callers strip nothing beforehand; separators such as `.`, `-`, `(`, `)` and
//! spaces are ignored for the national ID and phone checks.

/// Number of digits in a national ID (nine body digits + two check digits).
pub const NATIONAL_ID_LEN: usize = 11;

/// Number of digits in a one-time code.
pub const OTP_LEN: usize = 6;

/// Keep only the ASCII digits of `raw`.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Compute one mod-11 check digit over `digits`.
///
/// Weights count down from `digits.len() + 1` to 2. A remainder below 2
/// maps to check digit 0.
pub fn mod11_check_digit(digits: &[u8]) -> u8 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * (top - i as u32))
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}

/// Compute both check digits for a nine-digit national ID body.
pub fn national_id_check_digits(body: &[u8; 9]) -> (u8, u8) {
    let first = mod11_check_digit(body);
    let mut with_first = [0u8; 10];
    with_first[..9].copy_from_slice(body);
    with_first[9] = first;
    let second = mod11_check_digit(&with_first);
    (first, second)
}

/// Validate a national ID.
///
/// Strips non-digits, requires exactly 11 digits that are not all identical,
/// and checks both trailing digits against their mod-11 checksums.
pub fn validate_national_id(raw: &str) -> bool {
    let digits: Vec<u8> = raw
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();

    if digits.len() != NATIONAL_ID_LEN {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let mut body = [0u8; 9];
    body.copy_from_slice(&digits[..9]);
    let (first, second) = national_id_check_digits(&body);
    digits[9] == first && digits[10] == second
}

/// Validate a phone number: area code + number, 10 or 11 digits after
/// stripping separators.
pub fn validate_phone(raw: &str) -> bool {
    let count = raw.chars().filter(|c| c.is_ascii_digit()).count();
    count == 10 || count == 11
}

/// Validate a one-time code: exactly six ASCII digits, nothing else.
pub fn validate_otp(raw: &str) -> bool {
    raw.len() == OTP_LEN && raw.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_valid_national_ids() {
        assert!(validate_national_id("52998224725"));
        assert!(validate_national_id("529.982.247-25"));
        assert!(validate_national_id("11144477735"));
    }

    #[test]
    fn known_invalid_national_ids() {
        assert!(!validate_national_id("52998224724"));
        assert!(!validate_national_id("52998224735"));
        assert!(!validate_national_id("11144477736"));
    }

    #[test]
    fn identical_digit_ids_rejected() {
        for d in 0..=9u8 {
            let id: String = std::iter::repeat(char::from(b'0' + d)).take(11).collect();
            assert!(!validate_national_id(&id), "{id} must be rejected");
        }
    }

    #[test]
    fn wrong_length_ids_rejected() {
        assert!(!validate_national_id(""));
        assert!(!validate_national_id("5299822472"));
        assert!(!validate_national_id("529982247250"));
        assert!(!validate_national_id("abcdefghijk"));
    }

    #[test]
    fn low_remainder_maps_to_zero() {
        // 100000002 -> weighted sum 10 + 2*2 = 14, remainder 3 -> 8
        assert_eq!(mod11_check_digit(&[1, 0, 0, 0, 0, 0, 0, 0, 2]), 8);
        // weighted sum 3*3 + 1*2 = 11 -> remainder 0 -> 0
        assert_eq!(mod11_check_digit(&[0, 0, 0, 0, 0, 0, 0, 3, 1]), 0);
        // weighted sum 12 -> remainder 1 -> 0
        assert_eq!(mod11_check_digit(&[0, 0, 0, 0, 0, 0, 0, 0, 6]), 0);
    }

    #[test]
    fn phone_shapes() {
        assert!(validate_phone("1199998888"));
        assert!(validate_phone("11999998888"));
        assert!(validate_phone("(11) 99999-8888"));
        assert!(!validate_phone("123"));
        assert!(!validate_phone("119999988889"));
        assert!(!validate_phone(""));
    }

    #[test]
    fn otp_shapes() {
        assert!(validate_otp("123456"));
        assert!(validate_otp("000000"));
        assert!(!validate_otp("12a456"));
        assert!(!validate_otp("12345"));
        assert!(!validate_otp("1234567"));
        assert!(!validate_otp(" 12345"));
        assert!(!validate_otp("１２３４５６"));
    }

    #[test]
    fn digits_only_strips_separators() {
        assert_eq!(digits_only("529.982.247-25"), "52998224725");
        assert_eq!(digits_only("(11) 9999-8888"), "1199998888");
    }
}

//! Keystroke normalizers for the two masked inputs of the form.

pub const PHONE_MAX_DIGITS: usize = 11;
pub const POSTAL_CODE_DIGITS: usize = 8;

const AREA_CODE_DIGITS: usize = 2;
const POSTAL_CODE_PREFIX: usize = 5;

fn leading_digits(raw: &str, limit: usize) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(limit)
        .collect()
}

/// Formats raw phone input as `(DD) DDDDD-DDDD` (mobile, 11 digits) or
/// `(DD) DDDD-DDDD` (landline, 10 digits). Partial input is formatted as far
/// as it goes. Only the digits of `raw` matter, so the output is a fixed point.
pub fn format_phone(raw: &str) -> String {
    let digits = leading_digits(raw, PHONE_MAX_DIGITS);
    if digits.len() <= AREA_CODE_DIGITS {
        return digits;
    }

    let (area, local) = digits.split_at(AREA_CODE_DIGITS);
    let split = if local.len() > 8 { 5 } else { 4 };
    if local.len() <= split {
        return format!("({area}) {local}");
    }

    let (head, tail) = local.split_at(split);
    format!("({area}) {head}-{tail}")
}

/// Formats raw CEP input as `DDDDD-DDD`, inserting the hyphen once more than
/// five digits are present. A CEP has eight digits, so a complete code is
/// nine characters long.
pub fn format_postal_code(raw: &str) -> String {
    let digits = postal_code_digits(raw);
    if digits.len() > POSTAL_CODE_PREFIX {
        let (prefix, suffix) = digits.split_at(POSTAL_CODE_PREFIX);
        format!("{prefix}-{suffix}")
    } else {
        digits
    }
}

pub fn postal_code_digits(raw: &str) -> String {
    leading_digits(raw, POSTAL_CODE_DIGITS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matches_shape(value: &str, shape: &str) -> bool {
        value.len() == shape.len()
            && value.chars().zip(shape.chars()).all(|(c, s)| match s {
                'D' => c.is_ascii_digit(),
                other => c == other,
            })
    }

    #[test]
    fn formats_mobile_and_landline_numbers() {
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("1134567890"), "(11) 3456-7890");
        assert_eq!(format_phone("+55 (11) 98765-4321 ramal"), "(55) 11987-6543");
    }

    #[test]
    fn formats_partial_phone_input() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("1"), "1");
        assert_eq!(format_phone("11"), "11");
        assert_eq!(format_phone("119"), "(11) 9");
        assert_eq!(format_phone("119876"), "(11) 9876");
        assert_eq!(format_phone("1198765"), "(11) 9876-5");
    }

    #[test]
    fn truncates_phone_to_eleven_digits() {
        assert_eq!(format_phone("119876543219999"), "(11) 98765-4321");
    }

    #[test]
    fn formats_postal_codes() {
        assert_eq!(format_postal_code("01310100"), "01310-100");
        assert_eq!(format_postal_code("01310"), "01310");
        assert_eq!(format_postal_code("013101"), "01310-1");
        assert_eq!(format_postal_code("01310-100999"), "01310-100");
        assert_eq!(format_postal_code("abc"), "");
    }

    proptest! {
        #[test]
        fn phone_output_is_idempotent(raw in ".{0,40}") {
            let once = format_phone(&raw);
            prop_assert_eq!(format_phone(&once), once);
        }

        #[test]
        fn complete_phone_numbers_match_mask(digits in "[0-9]{10,11}", noise in "[ ()+.-]{0,4}") {
            let formatted = format_phone(&format!("{noise}{digits}"));
            let shape = if digits.len() == 11 { "(DD) DDDDD-DDDD" } else { "(DD) DDDD-DDDD" };
            prop_assert!(matches_shape(&formatted, shape), "{} does not match {}", formatted, shape);
        }

        #[test]
        fn postal_code_is_hyphenated_and_bounded(raw in ".{0,40}") {
            let formatted = format_postal_code(&raw);
            prop_assert!(formatted.len() <= 9);
            let digits = postal_code_digits(&raw);
            if digits.len() >= 6 {
                let shape = format!("DDDDD-{}", "D".repeat(digits.len() - 5));
                prop_assert!(matches_shape(&formatted, &shape));
            } else {
                prop_assert_eq!(formatted, digits);
            }
        }

        #[test]
        fn complete_postal_codes_have_eight_digits(digits in "[0-9]{8,12}", noise in "[ .-]{0,3}") {
            let formatted = format_postal_code(&format!("{noise}{digits}"));
            prop_assert!(matches_shape(&formatted, "DDDDD-DDD"), "{} is not a complete CEP", formatted);
            prop_assert_eq!(&formatted[..5], &digits[..5]);
        }

        #[test]
        fn postal_code_is_idempotent(raw in ".{0,40}") {
            let once = format_postal_code(&raw);
            prop_assert_eq!(format_postal_code(&once), once);
        }
    }
}

//! Textual rendering of floating-point values.

/// Shortest round-trip decimal form of `value`.
///
/// Values with a decimal exponent in `-4..16` are written positionally and
/// always carry a fractional part (`1000000.0`, `0.3`); others use a
/// signed, two-digit exponent (`1e-05`, `7.888609052210118e-31`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let sign = if value.is_sign_negative() { "-" } else { "" };

    let body = if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
            } else {
                format!("{}.{}", &digits[..int_len], &digits[int_len..])
            }
        } else {
            format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
        }
    } else {
        let mantissa = if digits.len() > 1 {
            format!("{}.{}", &digits[..1], &digits[1..])
        } else {
            digits
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{exp_sign}{:02}", exponent.abs())
    };
    format!("{sign}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_range() {
        assert_eq!(format_float(1.0e6), "1000000.0");
        assert_eq!(format_float(0.3), "0.3");
        assert_eq!(format_float(1.34), "1.34");
        assert_eq!(format_float(22.0), "22.0");
        assert_eq!(format_float(-273.15), "-273.15");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(2.0e11), "200000000000.0");
    }

    #[test]
    fn exponent_range() {
        assert_eq!(format_float(1.0e-5), "1e-05");
        assert_eq!(format_float(1.2e-5), "1.2e-05");
        assert_eq!(format_float(1.0e16), "1e+16");
        assert_eq!(format_float(7.888609052210118e-31), "7.888609052210118e-31");
    }

    #[test]
    fn non_finite() {
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }
}

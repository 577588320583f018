// src/engineering.rs
// Engineering notation with SI prefixes

const PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "u", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

const MIN_EXPONENT: i32 = -24;
const MAX_EXPONENT: i32 = 24;

/// Format `value` as `"<mantissa> <prefix>"`, with the exponent a multiple of 3
/// clamped to the y..Y range. No unit is appended.
///
/// ```
/// use trc_reader::engineering::format;
///
/// assert_eq!(format(1500.0), "1.5 k");
/// assert_eq!(format(2e-9), "2 n");
/// assert_eq!(format(0.0), "0 ");
/// ```
pub fn format(value: f64) -> String {
    let mut exponent = if value == 0.0 || !value.is_finite() {
        0
    } else {
        (value.abs().log10().floor() as i32).div_euclid(3) * 3
    };
    exponent = exponent.clamp(MIN_EXPONENT, MAX_EXPONENT);

    let mut mantissa = value / 10f64.powi(exponent);

    // log10 can land one ulp on the wrong side of a power of ten
    if mantissa.abs() >= 1000.0 && exponent < MAX_EXPONENT {
        exponent += 3;
        mantissa = value / 10f64.powi(exponent);
    } else if mantissa != 0.0 && mantissa.abs() < 1.0 && exponent > MIN_EXPONENT {
        exponent -= 3;
        mantissa = value / 10f64.powi(exponent);
    }

    let index = ((exponent - MIN_EXPONENT) / 3) as usize;
    format!("{} {}", general(mantissa), PREFIXES[index])
}

/// Six significant digits, trailing zeros dropped, switching to scientific
/// notation for very large or very small magnitudes.
fn general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        // inf, -inf, nan
        return value.to_string().to_lowercase();
    }

    // The exponent is taken after rounding so 999999.7 becomes 1e+06
    let scientific = format!("{:.5e}", value);
    let (mantissa, exp) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs());
    }

    let decimals = (5 - exp).max(0) as usize;
    trim_zeros(&format!("{:.*}", decimals, value)).to_string()
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0 ")]
    #[case(1500.0, "1.5 k")]
    #[case(1e-9, "1 n")]
    #[case(1.0, "1 ")]
    #[case(1000.0, "1 k")]
    #[case(-2.5e-3, "-2.5 m")]
    #[case(5e-6, "5 u")]
    #[case(20e6, "20 M")]
    #[case(123456.0, "123.456 k")]
    fn formats_with_prefix(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format(value), expected);
    }

    #[test]
    fn clamps_beyond_yotta() {
        assert_eq!(format(1e30), "1e+06 Y");
    }

    #[test]
    fn clamps_below_yocto() {
        assert_eq!(format(1e-30), "1e-06 y");
    }

    #[test]
    fn non_finite_values_are_lowercase() {
        assert_eq!(format(f64::INFINITY), "inf ");
        assert_eq!(format(f64::NEG_INFINITY), "-inf ");
        assert_eq!(format(f64::NAN), "nan ");
    }

    #[test]
    fn rounds_to_six_significant_digits() {
        assert_eq!(general(1.0 / 3.0), "0.333333");
        assert_eq!(general(999.9999999), "1000");
    }
}

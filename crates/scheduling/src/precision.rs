//! Fixed output precision.
//!
//! Currency and hours: 2 decimals. Probabilities: 4. Percentages: 1.

/// Rounds half toward positive infinity.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

pub(crate) fn money(value: f64) -> f64 {
    round_to(value, 2)
}

pub(crate) fn hours(value: f64) -> f64 {
    round_to(value, 2)
}

pub(crate) fn probability(value: f64) -> f64 {
    round_to(value, 4)
}

pub(crate) fn percent(value: f64) -> f64 {
    round_to(value, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_up_for_both_signs() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
        assert_eq!(money(1234.567), 1234.57);
        assert_eq!(probability(0.123456), 0.1235);
        assert_eq!(percent(66.666), 66.7);
    }
}

//! Label formatting for the distance and price displays.

/// Fixed fare per whole kilometre travelled.
pub const PRICE_PER_KM: i64 = 3500;

/// Formats `value` with exactly `fraction_digits` digits after the
/// decimal point.
pub fn format_fraction(value: f64, fraction_digits: usize) -> String {
    format!("{:.1$}", value, fraction_digits)
}

/// Distance label shown next to the route, e.g. "3.4 KM".
pub fn distance_label(distance_meters: f64) -> String {
    format!("{} KM", format_fraction(distance_meters / 1000.0, 1))
}

/// Fare label for a route: whole kilometres times the fixed rate.
/// Partial kilometres are not billed, so anything under 1 km is free.
pub fn price_label(distance_meters: f64) -> String {
    let whole_km = (distance_meters / 1000.0).floor() as i64;
    (whole_km * PRICE_PER_KM).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_digits_are_fixed() {
        assert_eq!(format_fraction(3.44, 1), "3.4");
        assert_eq!(format_fraction(0.0, 1), "0.0");
        assert_eq!(format_fraction(12.0, 2), "12.00");
    }

    #[test]
    fn distance_label_shows_one_decimal_kilometre() {
        assert_eq!(distance_label(3400.0), "3.4 KM");
        assert_eq!(distance_label(0.0), "0.0 KM");
        assert_eq!(distance_label(12_345.0), "12.3 KM");
    }

    #[test]
    fn price_is_whole_kilometres_times_rate() {
        assert_eq!(price_label(3400.0), "10500");
        assert_eq!(price_label(5700.0), "17500");
        assert_eq!(price_label(900.0), "0");
        assert_eq!(price_label(1000.0), "3500");
    }
}

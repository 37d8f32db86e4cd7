use chrono::NaiveDateTime;

/// `1234567.8` with symbol `₩` renders as `₩1,234,568`; negatives as `-₩1,234`.
pub fn money(value: f64, symbol: &str) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{symbol}{}", group_thousands(rounded.abs() as u128))
}

pub fn signed_pct(value: f64) -> String {
    format!("{value:+.2}%")
}

pub fn pct(value: f64) -> String {
    format!("{value:.2}%")
}

pub fn amount(value: f64) -> String {
    format!("{value:.6}")
}

pub fn minute(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::time::parse_timestamp;

    #[test]
    fn money_groups_and_rounds() {
        assert_eq!(money(1_234_567.8, "₩"), "₩1,234,568");
        assert_eq!(money(999.4, "$"), "$999");
        assert_eq!(money(0.0, "₩"), "₩0");
        assert_eq!(money(-12_345.0, "₩"), "-₩12,345");
        assert_eq!(money(-0.3, "₩"), "₩0");
    }

    #[test]
    fn percentages() {
        assert_eq!(signed_pct(3.14159), "+3.14%");
        assert_eq!(signed_pct(-2.5), "-2.50%");
        assert_eq!(pct(55.556), "55.56%");
    }

    #[test]
    fn amounts_and_minutes() {
        assert_eq!(amount(0.0012346), "0.001235");
        let ts = parse_timestamp("2025-03-04T05:06:07.89").unwrap();
        assert_eq!(minute(&ts), "2025-03-04 05:06");
    }
}

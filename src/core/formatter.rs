use chrono::NaiveDate;

/// Returns "<service> -> *$<amount>*" (Slack bold markup around the amount).
pub fn format_summary_line(service: &str, amount: u64) -> String {
    format!("{} -> *${}*", service, amount)
}

/// Returns "Chart -> <url>".
pub fn format_chart_line(reference: &str) -> String {
    format!("Chart -> {}", reference)
}

/// Returns "$1,234" for whole-dollar amounts.
pub fn format_dollars(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${}", out)
}

/// Returns "Mar 01 – Mar 30" for an inclusive day range.
pub fn format_date_range(first: NaiveDate, last: NaiveDate) -> String {
    format!("{} – {}", first.format("%b %d"), last.format("%b %d"))
}

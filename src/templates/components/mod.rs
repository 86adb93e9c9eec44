use maud::{html, Markup};

pub mod compare;
pub mod error;
pub mod popup;

pub use compare::{compare_table, favorites_list};
pub use error::{fatal_page, html_error_response};
pub use popup::{popup_content, PopupListing};

/// Titled sidebar section.
pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h3 { (title) }
            (body)
        }
    }
}

/// Whole units with thousands separators: `1234567.4` → `"1,234,567"`.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

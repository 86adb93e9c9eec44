use crate::domain::Listing;
use crate::map::filter::PriceCategory;
use crate::map::view::Command;
use crate::templates::components::format_amount;
use maud::{html, Markup};

/// Side-by-side table of the listings on the compare list.
pub fn compare_table(listings: &[&Listing]) -> Markup {
    html! {
        section class="card compare-panel" {
            h3 { "Compare (" (listings.len()) ")" }
            @if listings.is_empty() {
                p class="muted" { "Add up to four listings from the map to compare them." }
            } @else {
                table class="compare-table" {
                    thead {
                        tr {
                            th {}
                            @for l in listings {
                                th { (l.title) }
                            }
                        }
                    }
                    tbody {
                        tr {
                            th { "Price" }
                            @for l in listings { td { (format_amount(l.price)) " " (l.currency) } }
                        }
                        tr {
                            th { "Size" }
                            @for l in listings {
                                td {
                                    @if l.size_m2 > 0.0 { (format_amount(l.size_m2)) " m²" } @else { "unknown" }
                                }
                            }
                        }
                        tr {
                            th { "Per m²" }
                            @for l in listings {
                                td {
                                    @match l.price_per_m2() {
                                        Some(ppm) => { (format_amount(ppm)) " " (l.currency) }
                                        None => { "–" }
                                    }
                                }
                            }
                        }
                        tr {
                            th { "Category" }
                            @for l in listings { td { (PriceCategory::of(l)) } }
                        }
                        tr {
                            th { "Rooms" }
                            @for l in listings {
                                td { @if let Some(r) = l.rooms { (r) } @else { "–" } }
                            }
                        }
                        tr {
                            th { "Baths" }
                            @for l in listings {
                                td { @if let Some(b) = l.bathrooms { (b) } @else { "–" } }
                            }
                        }
                        tr {
                            th { "Built" }
                            @for l in listings {
                                td { @if let Some(y) = l.known_year() { (y) } @else { "–" } }
                            }
                        }
                        tr {
                            th {}
                            @for l in listings {
                                td {
                                    button type="button" class="toggle toggle-compare active"
                                        data-command=(Command::TOGGLE_COMPARE) data-id=(l.id) { "Remove" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn favorites_list(listings: &[&Listing]) -> Markup {
    html! {
        section class="card favorites-panel" {
            h3 { "Favorites (" (listings.len()) ")" }
            ul {
                @for l in listings {
                    li data-id=(l.id) {
                        @if let Some(url) = &l.url {
                            a href=(url) target="_blank" rel="noopener" { (l.title) }
                        } @else {
                            (l.title)
                        }
                        " · " (format_amount(l.price)) " " (l.currency)
                        button type="button" class="toggle toggle-favorite active"
                            data-command=(Command::TOGGLE_FAVORITE) data-id=(l.id) { "✕" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn listing(id: &str, price: f64, size: f64) -> Listing {
        Listing {
            id: id.to_string(),
            title: format!("Home {id}"),
            price,
            currency: "EUR".to_string(),
            size_m2: size,
            rooms: Some(3),
            bathrooms: None,
            location: None,
            year_built: Some(1985),
            price_history: Vec::new(),
            image_url: None,
            url: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn compare_table_has_one_column_per_listing() {
        let a = listing("a", 150_000.0, 60.0);
        let b = listing("b", 420_000.0, 0.0);
        let html = compare_table(&[&a, &b]).into_string();

        assert!(html.contains("Compare (2)"));
        assert!(html.contains("Home a"));
        assert!(html.contains("2,500 EUR"));
        assert!(html.contains("unknown"));
        assert_eq!(html.matches(r#"data-command="toggle-compare""#).count(), 2);
    }

    #[test]
    fn empty_compare_shows_hint() {
        let html = compare_table(&[]).into_string();
        assert!(html.contains("Compare (0)"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn favorites_list_links_when_possible() {
        let mut a = listing("a", 150_000.0, 60.0);
        a.url = Some("https://example.com/a".to_string());
        let b = listing("b", 90_000.0, 30.0);
        let html = favorites_list(&[&a, &b]).into_string();
        assert!(html.contains(r#"href="https://example.com/a""#));
        assert!(html.contains("Home b"));
        assert!(html.contains("Favorites (2)"));
    }
}

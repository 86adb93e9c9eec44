use crate::domain::PricePoint;
use crate::map::selection::SelectionSnapshot;
use crate::map::view::Command;
use crate::templates::components::format_amount;
use chrono::{DateTime, Utc};
use geojson::JsonObject;
use maud::{html, Markup};
use serde::Deserialize;
use tracing::warn;

/// Bars live between these percentages of the chart track.
const BAR_MIN_PCT: f64 = 20.0;
const BAR_MAX_PCT: f64 = 90.0;
const BAR_FLAT_PCT: f64 = 50.0;

/// A listing as read back from a clicked map feature's property bag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopupListing {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub price_per_m2: Option<f64>,
    #[serde(default)]
    pub rooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    /// Serialized price history, as pushed by the synchronizer.
    #[serde(default)]
    pub history: String,
}

impl PopupListing {
    pub fn from_properties(props: &JsonObject) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(props.clone()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
    pub height_pct: f64,
    pub latest: bool,
}

/// Turn a serialized history into chart bars, oldest first.
///
/// Unreadable or empty history becomes a single bar at the current price.
pub fn chart_bars(history: &str, current_price: f64, now: DateTime<Utc>) -> Vec<ChartBar> {
    let mut points: Vec<PricePoint> = if history.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(history).unwrap_or_else(|e| {
            warn!(error = %e, "unreadable price history, charting current price only");
            Vec::new()
        })
    };

    if points.is_empty() {
        points.push(PricePoint {
            price: current_price,
            recorded_at: now,
        });
    }

    points.sort_by_key(|p| p.recorded_at);

    let min = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
    let last = points.len() - 1;

    points
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let height_pct = if max > min {
                BAR_MIN_PCT + (p.price - min) / (max - min) * (BAR_MAX_PCT - BAR_MIN_PCT)
            } else {
                BAR_FLAT_PCT
            };
            ChartBar {
                price: p.price,
                recorded_at: p.recorded_at,
                height_pct,
                latest: i == last,
            }
        })
        .collect()
}

/// Popup body for the listings under one click: a detail panel for one, a
/// scrollable stack of summaries for several.
pub fn popup_content(
    listings: &[PopupListing],
    selection: SelectionSnapshot<'_>,
    now: DateTime<Utc>,
) -> Markup {
    match listings {
        [single] => detail_panel(single, selection, now),
        many => stacked_list(many, selection),
    }
}

fn detail_panel(l: &PopupListing, selection: SelectionSnapshot<'_>, now: DateTime<Utc>) -> Markup {
    let bars = chart_bars(&l.history, l.price, now);

    html! {
        div class="popup popup-single" data-id=(l.id) {
            @if let Some(image) = &l.image {
                img class="popup-image" src=(image) alt=(l.title);
            }
            h3 class="popup-title" { (l.title) }
            p class="popup-price" { (format_amount(l.price)) " " (l.currency) }
            p class="popup-size" {
                @if l.size > 0.0 {
                    (format_amount(l.size)) " m²"
                } @else {
                    "Size unknown"
                }
            }
            @if l.size > 0.0 {
                @if let Some(ppm) = l.price_per_m2 {
                    p class="popup-ppm" { (format_amount(ppm)) " " (l.currency) "/m²" }
                }
            }
            p class="popup-rooms" {
                @if let Some(rooms) = l.rooms { (rooms) " rooms" }
                @if l.rooms.is_some() && l.bathrooms.is_some() { " · " }
                @if let Some(baths) = l.bathrooms { (baths) " baths" }
            }
            @if let Some(year) = l.year.filter(|y| *y > 0) {
                p class="popup-year" { "Built " (year) }
            }

            (toggles(&l.id, selection))
            (price_chart(&bars, &l.currency))

            @if let Some(url) = &l.url {
                a class="popup-link" href=(url) target="_blank" rel="noopener" { "Open listing" }
            }
        }
    }
}

fn stacked_list(listings: &[PopupListing], selection: SelectionSnapshot<'_>) -> Markup {
    html! {
        div class="popup popup-stack" style="max-height: 320px; overflow-y: auto;" {
            p class="popup-count" { (listings.len()) " listings at this spot" }
            @for l in listings {
                div class="popup-item" data-id=(l.id) {
                    strong { (l.title) }
                    div class="popup-item-meta" {
                        span { (format_amount(l.price)) " " (l.currency) }
                        " · "
                        @if l.size > 0.0 {
                            span { (format_amount(l.size)) " m²" }
                        } @else {
                            span { "Size unknown" }
                        }
                    }
                    (toggles(&l.id, selection))
                }
            }
        }
    }
}

/// Favorite/compare buttons. They carry a command name and the listing id;
/// the host hands both to `Command::from_control` and dispatches the result.
fn toggles(id: &str, selection: SelectionSnapshot<'_>) -> Markup {
    let favorite = selection.is_favorite(id);
    let compared = selection.is_compared(id);

    html! {
        div class="popup-actions" {
            button
                type="button"
                class=(if favorite { "toggle toggle-favorite active" } else { "toggle toggle-favorite" })
                data-command=(Command::TOGGLE_FAVORITE)
                data-id=(id)
                aria-pressed=(if favorite { "true" } else { "false" })
            {
                @if favorite { "★ Saved" } @else { "☆ Save" }
            }
            button
                type="button"
                class=(if compared { "toggle toggle-compare active" } else { "toggle toggle-compare" })
                data-command=(Command::TOGGLE_COMPARE)
                data-id=(id)
                aria-pressed=(if compared { "true" } else { "false" })
            {
                @if compared { "Comparing" } @else { "Compare" }
            }
        }
    }
}

fn price_chart(bars: &[ChartBar], currency: &str) -> Markup {
    html! {
        div class="price-chart" style="display: flex; align-items: flex-end; height: 80px; gap: 2px;" {
            @for bar in bars {
                div
                    class=(if bar.latest { "bar bar-latest" } else { "bar" })
                    style=(format!("height: {:.1}%; flex: 1;", bar.height_pct))
                    title=(format!("{} {} · {}", format_amount(bar.price), currency, bar.recorded_at.format("%Y-%m-%d")))
                {}
            }
        }
    }
}

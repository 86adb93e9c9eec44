use crate::config::MapConfig;
use crate::domain::Listing;
use crate::errors::MapError;
use crate::map::bounds::{FilterBounds, PRICE_STEP, SIZE_STEP};
use crate::map::filter::PriceCategory;
use crate::map::view::Command;
use crate::templates::components::{card, compare_table, fatal_page, favorites_list};
use crate::templates::layouts::desktop::desktop_layout_with_head;
use maud::{html, Markup};

pub struct MapPageVm<'a> {
    pub config: &'a MapConfig,
    pub bounds: &'a FilterBounds,
    pub listing_count: usize,
    pub favorites: Vec<&'a Listing>,
    pub compare: Vec<&'a Listing>,
}

pub fn map_page(vm: &MapPageVm<'_>) -> Markup {
    let head = html! {
        link rel="stylesheet" href="https://api.mapbox.com/mapbox-gl-js/v3.3.0/mapbox-gl.css";
        script src="https://api.mapbox.com/mapbox-gl-js/v3.3.0/mapbox-gl.js" defer {}
    };

    desktop_layout_with_head(
        "Listing Map",
        head,
        html! {
            main class="map-layout" {
                aside class="filters" {
                    p class="muted" { (vm.listing_count) " listings loaded" }
                    (category_toggles())
                    (range_inputs(vm.bounds))
                    (polygon_controls())
                }

                @match &vm.config.token {
                    Some(token) => {
                        div id="map"
                            style="width: 100%; height: 80vh;"
                            data-token=(token)
                            data-style=(vm.config.style_url)
                            data-center=(format!("{},{}", vm.config.center.lng, vm.config.center.lat))
                            data-zoom=(vm.config.zoom)
                            data-fit-padding=(vm.config.fit_padding_px)
                            data-fit-max-zoom=(vm.config.fit_max_zoom)
                            data-fit-duration=(vm.config.fit_duration_ms)
                            data-source="/api/listings"
                        {}
                    }
                    None => { (fatal_page(&MapError::MissingToken.to_string())) }
                }

                aside class="selections" {
                    (compare_table(&vm.compare))
                    (favorites_list(&vm.favorites))
                }
            }
        },
    )
}

fn category_toggles() -> Markup {
    card(
        "Price per m²",
        html! {
            @for category in PriceCategory::ALL {
                label class=(format!("category category-{category}")) {
                    input type="checkbox" name=(Command::CATEGORY) value=(category) checked;
                    " " (category)
                }
            }
        },
    )
}

fn range_inputs(bounds: &FilterBounds) -> Markup {
    let size = bounds.size;
    let price = bounds.price;
    let year = bounds.year;
    let timeline = bounds.timeline;

    card(
        "Filters",
        html! {
            fieldset class="range" data-facet="size" {
                legend { "Size (m²)" }
                input type="range" name=(Command::SIZE_MIN) step=(SIZE_STEP)
                    min=(size.available.min) max=(size.available.max) value=(size.selected.min);
                input type="range" name=(Command::SIZE_MAX) step=(SIZE_STEP)
                    min=(size.available.min) max=(size.available.max) value=(size.selected.max);
            }
            fieldset class="range" data-facet="price" {
                legend { "Price" }
                input type="range" name=(Command::PRICE_MIN) step=(PRICE_STEP)
                    min=(price.available.min) max=(price.available.max) value=(price.selected.min);
                input type="range" name=(Command::PRICE_MAX) step=(PRICE_STEP)
                    min=(price.available.min) max=(price.available.max) value=(price.selected.max);
            }
            fieldset class="range" data-facet="year" {
                legend { "Year built" }
                input type="number" name=(Command::YEAR_MIN)
                    min=(year.available.min) max=(year.available.max) value=(year.selected.min);
                input type="number" name=(Command::YEAR_MAX)
                    min=(year.available.min) max=(year.available.max) value=(year.selected.max);
            }
            fieldset class="range" data-facet="timeline" {
                legend { "On the market since" }
                input type="date" name=(Command::TIMELINE_START)
                    min=(timeline.available.min) max=(timeline.available.max) value=(timeline.selected.min);
                span class="muted" { " until " (timeline.available.max) }
            }
        },
    )
}

fn polygon_controls() -> Markup {
    card(
        "Search area",
        html! {
            button type="button" data-command=(Command::START_DRAWING) { "Draw area" }
            button type="button" data-command=(Command::COMPLETE_POLYGON) { "Finish" }
            button type="button" data-command=(Command::CLEAR_POLYGON) { "Clear" }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_renders_blocking_message() {
        let config = MapConfig::default();
        let bounds = FilterBounds::default();
        let vm = MapPageVm {
            config: &config,
            bounds: &bounds,
            listing_count: 0,
            favorites: Vec::new(),
            compare: Vec::new(),
        };
        let html = map_page(&vm).into_string();
        assert!(html.contains("Map credential is not configured"));
        assert!(!html.contains(r#"id="map""#));
    }

    #[test]
    fn sliders_follow_bounds() {
        let config = MapConfig {
            token: Some("pk.test".into()),
            ..MapConfig::default()
        };
        let mut bounds = FilterBounds::default();
        bounds.price.reset(50_000.0, 450_000.0);
        let vm = MapPageVm {
            config: &config,
            bounds: &bounds,
            listing_count: 7,
            favorites: Vec::new(),
            compare: Vec::new(),
        };
        let html = map_page(&vm).into_string();
        assert!(html.contains(r#"data-token="pk.test""#));
        assert!(html.contains(r#"name="price-min" step="10000" min="50000" max="450000" value="50000""#));
        assert!(html.contains("7 listings loaded"));
        assert_eq!(html.matches(r#"name="category""#).count(), 4);
    }
}

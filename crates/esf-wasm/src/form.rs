//! Form renderer
//!
//! Injects the extra controls into the host filter panel and wires them to
//! the filter session. Markup comes from plain builder functions; everything
//! touching the live document lives below them.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent};

use esf_core::host::{
    client_filter_selector, BLOCK_RULE_SELECTOR, CHECKED_CLASS, CLIENT_FILTER_BLOCK_SELECTOR,
    DEMO_TOGGLE_ID, DISCOUNT_SLIDER, DISPLAY_SUFFIX, F2P_TOGGLE_ID, FORM_ID, PRICE_BLOCK_SELECTOR,
    PRICE_RANGE_SELECTOR, RATING_SLIDER, SPECIALS_ROW_SELECTOR, SPECIALS_SELECTOR,
};
use esf_core::text::{clamp_to_limits, slider_display, to_float};
use esf_core::{Bound, FilterFlags, FilterOptions};

use crate::dom::{element_from_html, fire, on, query, query_all_in, query_doc, set_displayed};
use crate::{document, refilter, window, InitError, SharedApp};

/// Delay before re-committing a number input whose text was recovered.
const RECOVERY_BLUR_DELAY_MS: i32 = 50;

/// Host client filters and the flag that defers marked rows to them.
const CLIENT_FILTERS: [(&str, FilterFlags); 3] = [
    ("hide_owned", FilterFlags::PASS_OWNED),
    ("hide_ignored", FilterFlags::PASS_IGNORED),
    ("hide_wishlist", FilterFlags::PASS_WISHLIST),
];

// =============================================================================
// Markup
// =============================================================================

fn display_style(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        r#" style="display:none""#
    }
}

fn number_input_html(bound: Bound, label: &str, max: Option<f64>) -> String {
    let id = bound.control_id();
    let max = max.map(|max| format!(r#" max="{max}""#)).unwrap_or_default();
    format!(
        r#"<div class="ex-filter-block-half"><label for="{id}">{label}:</label><input id="{id}" type="number" name="{id}"{max} min="0" step="1" form="{FORM_ID}" /></div>"#
    )
}

/// Max/min number inputs under a caption.
pub fn price_block_html(
    caption: &str,
    upper: Bound,
    lower: Bound,
    ceiling: Option<f64>,
    visible: bool,
) -> String {
    format!(
        r#"<div class="ex-filter-block"{style}><div class="ex-filter-caption">{caption}:</div>{max}{min}</div>"#,
        style = display_style(visible),
        max = number_input_html(upper, "Max", ceiling),
        min = number_input_html(lower, "Min", ceiling),
    )
}

/// Checkbox row styled like the host's client filters.
pub fn toggle_row_html(id: &str, label: &str) -> String {
    format!(
        r#"<div class="tab_filter_control_row" data-value="__toggle" data-clientside="1"><span class="tab_filter_control tab_filter_control_include" id="{id}" data-value="__toggle" data-clientside="1"><span><span class="tab_filter_control_checkbox"></span><span class="tab_filter_control_label">{label}</span></span></span></div>"#
    )
}

/// Range input plus its value display. Starts at the minimum ("Any").
pub fn slider_html(bound: Bound, (min, max, step): (f64, f64, f64)) -> String {
    let id = bound.control_id();
    format!(
        r#"<div class="range_container_inner"><input class="range_input" type="range" id="{id}" name="{id}" min="{min}" max="{max}" step="{step}" value="{min}" form="{FORM_ID}" /></div><div class="range_display" id="{id}{DISPLAY_SUFFIX}">{display}</div>"#,
        display = slider_display(min, min),
    )
}

pub fn discount_block_html(visible: bool) -> String {
    format!(
        r#"<div class="range_container"{style}>{slider}</div>"#,
        style = display_style(visible),
        slider = slider_html(Bound::Discount, DISCOUNT_SLIDER),
    )
}

/// Collapsible panel block holding the rating slider.
pub fn rating_block_html() -> String {
    format!(
        r#"<div class="block search_collapse_block" data-collapse-name="rating"><div class="block_header"><div>Narrow by Rating</div></div><div class="block_content block_content_inner ex-filter-block"><div class="range_container">{slider}</div></div></div>"#,
        slider = slider_html(Bound::Rating, RATING_SLIDER),
    )
}

// =============================================================================
// Host Panel
// =============================================================================

/// Host controls the injected form hooks into.
#[derive(Clone)]
struct HostPanel {
    price_block: HtmlElement,
    price_range: HtmlInputElement,
    specials: HtmlElement,
    specials_row: Option<Element>,
    separators: Vec<HtmlElement>,
}

impl HostPanel {
    fn find(document: &Document) -> Result<Self, InitError> {
        let price_block = query_doc(document, PRICE_BLOCK_SELECTOR)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or(InitError::MissingElement("price filter block"))?;
        let price_range = query(&price_block, PRICE_RANGE_SELECTOR)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .ok_or(InitError::MissingElement("price range slider"))?;
        let specials = query(&price_block, SPECIALS_SELECTOR)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or(InitError::MissingElement("specials toggle"))?;

        Ok(Self {
            specials_row: query(&price_block, SPECIALS_ROW_SELECTOR),
            separators: query_all_in(&price_block, BLOCK_RULE_SELECTOR),
            price_block,
            price_range,
            specials,
        })
    }

    fn specials_checked(&self) -> bool {
        self.specials.class_list().contains(CHECKED_CLASS)
    }
}

/// Seed the options from the host's own filter state. Returns the price
/// ceiling of the selected tier.
fn seed(app: &SharedApp, host: &HostPanel, document: &Document) -> Option<f64> {
    let mut app = app.borrow_mut();
    let value = host.price_range.value();
    let ceiling = app.stops.ceiling_for(&value);

    let options = app.session.options_mut();
    options.set_flag(
        FilterFlags::PRICE_FILTERING,
        to_float(&value) > to_float(&host.price_range.min()),
    );
    options.set_flag(FilterFlags::WITH_DISCOUNT, host.specials_checked());

    for (value, flag) in CLIENT_FILTERS {
        let selector = format!("{CLIENT_FILTER_BLOCK_SELECTOR} {}", client_filter_selector(value));
        if let Some(el) = query_doc(document, &selector) {
            options.set_flag(flag, el.class_list().contains(CHECKED_CLASS));
        }
    }

    ceiling
}

// =============================================================================
// Injected Controls
// =============================================================================

#[derive(Clone)]
struct Injected {
    actual: HtmlElement,
    base: HtmlElement,
    f2p_row: HtmlElement,
    demo_row: HtmlElement,
    discount: HtmlElement,
    rating: HtmlElement,
}

impl Injected {
    fn insert(
        document: &Document,
        host: &HostPanel,
        options: &FilterOptions,
        ceiling: Option<f64>,
    ) -> Result<Self, JsValue> {
        let price_filtering = options.has(FilterFlags::PRICE_FILTERING);
        let with_discount = options.has(FilterFlags::WITH_DISCOUNT);

        let base = element_from_html(
            document,
            &price_block_html("Base price", Bound::BaseMaxPrice, Bound::BaseMinPrice, None, with_discount),
        )?;
        if let Some(rule) = host.separators.first() {
            rule.before_with_node_1(&base)?;
        } else {
            host.price_block.append_child(&base)?;
        }

        let actual = element_from_html(
            document,
            &price_block_html("Actual price", Bound::MaxPrice, Bound::MinPrice, ceiling, price_filtering),
        )?;
        base.before_with_node_1(&actual)?;

        let demo_row = element_from_html(document, &toggle_row_html(DEMO_TOGGLE_ID, "Hide demo &amp; prologues"))?;
        base.after_with_node_1(&demo_row)?;
        let f2p_row = element_from_html(document, &toggle_row_html(F2P_TOGGLE_ID, "Show free products"))?;
        base.after_with_node_1(&f2p_row)?;

        let discount = element_from_html(document, &discount_block_html(with_discount))?;
        if let Some(row) = &host.specials_row {
            row.after_with_node_1(&discount)?;
        } else {
            host.price_block.append_child(&discount)?;
        }

        let rating = element_from_html(document, &rating_block_html())?;
        host.price_block.after_with_node_1(&rating)?;

        Ok(Self { actual, base, f2p_row, demo_row, discount, rating })
    }
}

fn input_by_id(document: &Document, id: &str) -> Option<HtmlInputElement> {
    document.get_element_by_id(id)?.dyn_into().ok()
}

fn control_by_id(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| JsValue::from_str(id))
}

fn attr_f64(el: &Element, name: &str) -> Option<f64> {
    el.get_attribute(name)?.trim().parse().ok()
}

/// Run `f` once after `delay_ms`.
fn defer<F: FnOnce() + 'static>(delay_ms: i32, f: F) {
    let Ok(window) = window() else { return };
    let callback = Closure::once_into_js(f);
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms,
    );
}

/// Store a bound and mirror the pair adjustment onto the partner control.
fn commit(app: &SharedApp, bound: Bound, value: f64) {
    let update = app.borrow_mut().session.options_mut().set_bound(bound, value);
    if !update.changed {
        return;
    }

    let Ok(document) = document() else { return };
    let partner = update
        .partner
        .and_then(|partner| input_by_id(&document, partner.control_id()));
    if let Some(partner) = partner {
        match update.partner_limit {
            Some(limit) if bound.is_lower() => {
                let _ = partner.set_attribute("min", &limit.to_string());
            }
            Some(limit) => {
                let _ = partner.set_attribute("max", &limit.to_string());
            }
            None if bound.is_lower() => {
                let _ = partner.set_attribute("min", "0");
            }
            None => {
                // Back to the host ceiling the cleared input still carries.
                let ceiling = input_by_id(&document, bound.control_id())
                    .and_then(|input| input.get_attribute("max"));
                let _ = match ceiling {
                    Some(ceiling) => partner.set_attribute("max", &ceiling),
                    None => partner.remove_attribute("max"),
                };
            }
        }
        if let Some(value) = update.partner_value {
            partner.set_value_as_number(value);
        }
    }

    refilter(app);
}

// =============================================================================
// Number Inputs
// =============================================================================

fn clamp_input(input: &HtmlInputElement) {
    let value = input.value_as_number();
    if value.is_nan() {
        return;
    }
    let clamped = clamp_to_limits(value, attr_f64(input, "min"), attr_f64(input, "max"));
    if clamped != value {
        input.set_value_as_number(clamped);
    }
}

/// Salvage a number out of text the input rejected, then commit again.
fn recover_number(input: &HtmlInputElement) {
    input.select();
    let selected = document()
        .ok()
        .and_then(|document| document.get_selection().ok().flatten())
        .map(|selection| String::from(selection.to_string()))
        .unwrap_or_default();

    let value = to_float(&selected);
    if value > 0.0 {
        input.set_value(&value.to_string());
    } else {
        input.set_value("");
    }

    let target = input.clone();
    defer(RECOVERY_BLUR_DELAY_MS, move || fire(&target, "blur"));
}

fn commit_number(app: &SharedApp, input: &HtmlInputElement, bound: Bound) {
    let value = input.value_as_number();
    if value.is_nan() && !input.value().trim().is_empty() {
        recover_number(input);
        return;
    }
    commit(app, bound, if value.is_nan() { 0.0 } else { value });
}

fn wire_number_input(app: &SharedApp, input: &HtmlInputElement, bound: Bound) -> Result<(), JsValue> {
    let target = input.clone();
    on(input, "change", move |_| clamp_input(&target))?;

    let (target, app) = (input.clone(), app.clone());
    on(input, "blur", move |_| commit_number(&app, &target, bound))?;

    let target = input.clone();
    on(input, "keypress", move |event| {
        let enter = event
            .dyn_ref::<KeyboardEvent>()
            .is_some_and(|event| event.key() == "Enter");
        if enter {
            fire(&target, "change");
            fire(&target, "blur");
        }
    })
}

// =============================================================================
// Sliders and Toggles
// =============================================================================

fn wire_slider(
    app: &SharedApp,
    document: &Document,
    bound: Bound,
    (min, _, _): (f64, f64, f64),
) -> Result<(), JsValue> {
    let input = input_by_id(document, bound.control_id())
        .ok_or_else(|| JsValue::from_str(bound.control_id()))?;
    let display = document.get_element_by_id(&format!("{}{DISPLAY_SUFFIX}", bound.control_id()));

    let target = input.clone();
    on(&input, "input", move |_| {
        if let Some(display) = &display {
            display.set_text_content(Some(&slider_display(to_float(&target.value()), min)));
        }
    })?;

    let (target, app) = (input.clone(), app.clone());
    on(&input, "change", move |_| {
        let value = to_float(&target.value());
        // The minimum position means "any".
        commit(&app, bound, if value > min { value } else { 0.0 });
    })
}

fn wire_toggle<F>(app: &SharedApp, control: &HtmlElement, flag: FilterFlags, after: F) -> Result<(), JsValue>
where
    F: Fn(bool) + 'static,
{
    let (target, app) = (control.clone(), app.clone());
    on(control, "click", move |_| {
        let _ = target.class_list().toggle(CHECKED_CLASS);
        let enabled = app.borrow_mut().session.options_mut().toggle(flag);
        after(enabled);
        refilter(&app);
    })
}

/// Host client filters decide for marked rows while they are checked.
fn wire_client_filters(app: &SharedApp, document: &Document) -> Result<(), JsValue> {
    for (value, flag) in CLIENT_FILTERS {
        let selector = format!("{CLIENT_FILTER_BLOCK_SELECTOR} {}", client_filter_selector(value));
        let Some(control) = query_doc(document, &selector) else {
            log::debug!("Client filter {value} not found");
            continue;
        };
        let app = app.clone();
        on(&control, "click", move |_| {
            app.borrow_mut().session.options_mut().toggle(flag);
            refilter(&app);
        })?;
    }
    Ok(())
}

fn wire_rating_collapse(rating: &HtmlElement) -> Result<(), JsValue> {
    let Some(header) = query(rating, ".block_header") else {
        return Ok(());
    };
    let content = query(rating, ".block_content_inner").and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let block = rating.clone();
    on(&header, "click", move |_| {
        let collapsed = block.class_list().toggle("collapsed").unwrap_or(false);
        if let Some(content) = &content {
            set_displayed(content, !collapsed);
        }
    })
}

// =============================================================================
// Host Price Controls
// =============================================================================

/// Host price tier changed: follow its ceiling and show or hide price controls.
fn on_price_range_change(app: &SharedApp, document: &Document, host: &HostPanel, ui: &Injected) {
    let range = &host.price_range;
    let value = range.value();
    let filtering = to_float(&value) != to_float(&range.min());

    let (ceiling, capped, with_discount) = {
        let mut app = app.borrow_mut();
        let ceiling = if filtering && to_float(&value) < to_float(&range.max()) {
            app.stops.ceiling_for(&value)
        } else {
            None
        };
        let options = app.session.options_mut();
        options.set_flag(FilterFlags::PRICE_FILTERING, filtering);
        let with_discount = options.has(FilterFlags::WITH_DISCOUNT);
        let capped = filtering && options.cap_max_price(ceiling);
        (ceiling, capped.then(|| options.clone()), with_discount)
    };

    if filtering {
        if let Some(max_input) = input_by_id(document, Bound::MaxPrice.control_id()) {
            match ceiling {
                Some(ceiling) => {
                    let _ = max_input.set_attribute("max", &ceiling.to_string());
                    fire(&max_input, "change");
                }
                None => {
                    let _ = max_input.remove_attribute("max");
                }
            }
        }
        if let Some(options) = capped {
            for bound in [Bound::MaxPrice, Bound::MinPrice] {
                if let (Some(input), Some(v)) = (input_by_id(document, bound.control_id()), options.get(bound)) {
                    input.set_value_as_number(v);
                }
            }
        }

        set_displayed(&ui.actual, true);
        if with_discount {
            set_displayed(&ui.base, true);
        }
        set_displayed(&ui.f2p_row, true);
        for separator in &host.separators {
            set_displayed(separator, true);
        }
        set_displayed(&host.specials, true);
    } else {
        // Only free products are listed.
        set_displayed(&ui.f2p_row, false);
        for separator in &host.separators {
            set_displayed(separator, false);
        }
        if host.specials_checked() {
            host.specials.click();
        }
        set_displayed(&host.specials, false);
        set_displayed(&ui.actual, false);
    }

    refilter(app);
}

// =============================================================================
// Render
// =============================================================================

pub(crate) fn render(app: &SharedApp, document: &Document) -> Result<(), InitError> {
    let host = HostPanel::find(document)?;
    let ceiling = seed(app, &host, document);

    let form = document.create_element("form")?;
    form.set_id(FORM_ID);
    document
        .body()
        .ok_or(InitError::MissingElement("body"))?
        .append_child(&form)?;
    on(&form, "submit", |event| {
        event.prevent_default();
        event.stop_propagation();
    })?;

    let options = app.borrow().session.options().clone();
    let ui = Injected::insert(document, &host, &options, ceiling)?;

    for bound in [Bound::MinPrice, Bound::MaxPrice, Bound::BaseMinPrice, Bound::BaseMaxPrice] {
        let input = input_by_id(document, bound.control_id())
            .ok_or(InitError::MissingElement("price input"))?;
        wire_number_input(app, &input, bound)?;
    }
    wire_slider(app, document, Bound::Discount, DISCOUNT_SLIDER)?;
    wire_slider(app, document, Bound::Rating, RATING_SLIDER)?;

    wire_toggle(app, &control_by_id(document, DEMO_TOGGLE_ID)?, FilterFlags::FILTER_DEMO, |_| {})?;
    let demo_row = ui.demo_row.clone();
    wire_toggle(app, &control_by_id(document, F2P_TOGGLE_ID)?, FilterFlags::FILTER_F2P, move |enabled| {
        set_displayed(&demo_row, !enabled);
    })?;

    let (app_, base, discount) = (app.clone(), ui.base.clone(), ui.discount.clone());
    on(&host.specials, "click", move |_| {
        let enabled = app_.borrow_mut().session.options_mut().toggle(FilterFlags::WITH_DISCOUNT);
        set_displayed(&base, enabled);
        set_displayed(&discount, enabled);
        refilter(&app_);
    })?;

    wire_client_filters(app, document)?;
    wire_rating_collapse(&ui.rating)?;

    let (app_, document_, host_, ui_) = (app.clone(), document.clone(), host.clone(), ui.clone());
    on(&host.price_range, "change", move |_| {
        on_price_range_change(&app_, &document_, &host_, &ui_);
    })?;
    fire(&host.price_range, "change");

    log::debug!("Filter form rendered");
    Ok(())
}

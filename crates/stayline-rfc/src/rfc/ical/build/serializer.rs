//! iCalendar serializer (RFC 5545).
//!
//! Serializes the component tree to CRLF-terminated, folded text.

use super::escape::{escape_param_value, escape_text};
use super::fold::fold_line;
use crate::rfc::ical::core::{Component, ComponentKind, ICalendar, Parameter, Property, Value};

/// Serializes an iCalendar document to a string.
#[must_use]
pub fn serialize(ical: &ICalendar) -> String {
    serialize_component(&ical.root)
}

/// Serializes a component to a string.
///
/// Properties follow a canonical order; child components keep their
/// insertion order, with VTIMEZONE definitions moved first.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    let mut result = String::new();

    result.push_str(&fold_line(&format!("BEGIN:{}", component.name)));

    for prop in canonical_property_order(&component.properties, component.kind) {
        result.push_str(&serialize_property(prop));
    }

    let (timezones, others): (Vec<&Component>, Vec<&Component>) = component
        .children
        .iter()
        .partition(|c| c.kind == ComponentKind::Timezone);
    for child in timezones.into_iter().chain(others) {
        result.push_str(&serialize_component(child));
    }

    result.push_str(&fold_line(&format!("END:{}", component.name)));

    result
}

/// Serializes a property to a folded content line.
#[must_use]
pub fn serialize_property(prop: &Property) -> String {
    let mut line = prop.name.clone();

    for param in canonical_param_order(&prop.params) {
        line.push(';');
        line.push_str(&serialize_parameter(param));
    }

    line.push(':');
    line.push_str(&serialize_value(&prop.value, &prop.raw_value));

    fold_line(&line)
}

fn serialize_parameter(param: &Parameter) -> String {
    let values: Vec<String> = param.values.iter().map(|v| escape_param_value(v)).collect();
    format!("{}={}", param.name, values.join(","))
}

/// Text is re-escaped; every other value is written as its raw form.
fn serialize_value(value: &Value, raw_value: &str) -> String {
    match value {
        Value::Text(s) => escape_text(s),
        _ => raw_value.to_string(),
    }
}

/// Returns properties in canonical order for deterministic output.
fn canonical_property_order(props: &[Property], kind: ComponentKind) -> Vec<&Property> {
    let order: &[&str] = match kind {
        ComponentKind::Calendar => &["VERSION", "PRODID", "CALSCALE", "METHOD"],
        ComponentKind::Event => &[
            "UID",
            "DTSTAMP",
            "DTSTART",
            "DTEND",
            "SUMMARY",
            "DESCRIPTION",
            "STATUS",
            "TRANSP",
        ],
        ComponentKind::Timezone | ComponentKind::Alarm | ComponentKind::Other => &[],
    };

    let mut ordered: Vec<&Property> = Vec::with_capacity(props.len());

    for &name in order {
        ordered.extend(props.iter().filter(|p| p.name.eq_ignore_ascii_case(name)));
    }

    // Remaining properties (including X-properties) keep their original order.
    ordered.extend(
        props
            .iter()
            .filter(|p| !order.iter().any(|&n| p.name.eq_ignore_ascii_case(n))),
    );

    ordered
}

/// Returns parameters with VALUE and TZID first.
fn canonical_param_order(params: &[Parameter]) -> Vec<&Parameter> {
    const ORDER: [&str; 2] = ["VALUE", "TZID"];

    let mut ordered: Vec<&Parameter> = Vec::with_capacity(params.len());
    for name in ORDER {
        ordered.extend(params.iter().filter(|p| p.name.eq_ignore_ascii_case(name)));
    }
    ordered.extend(
        params
            .iter()
            .filter(|p| !ORDER.iter().any(|n| p.name.eq_ignore_ascii_case(n))),
    );
    ordered
}

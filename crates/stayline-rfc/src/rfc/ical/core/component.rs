//! Component tree of a calendar document.

use super::{Property, names};

/// The components a booking feed is made of. Anything else is kept as
/// [`ComponentKind::Other`] under its original name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Calendar,
    Event,
    /// Timezone definitions, passed through untouched.
    Timezone,
    Alarm,
    Other,
}

impl ComponentKind {
    /// Matches a BEGIN/END name, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        [
            ("VCALENDAR", Self::Calendar),
            ("VEVENT", Self::Event),
            ("VTIMEZONE", Self::Timezone),
            ("VALARM", Self::Alarm),
        ]
        .into_iter()
        .find_map(|(known, kind)| name.eq_ignore_ascii_case(known).then_some(kind))
        .unwrap_or(Self::Other)
    }

    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Calendar => Some("VCALENDAR"),
            Self::Event => Some("VEVENT"),
            Self::Timezone => Some("VTIMEZONE"),
            Self::Alarm => Some("VALARM"),
            Self::Other => None,
        }
    }
}

/// A BEGIN/END block with its properties and nested blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub kind: ComponentKind,
    /// Name as written in the document, upper-cased.
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<Component>,
}

impl Component {
    /// ## Summary
    /// Creates an empty component named after its kind.
    ///
    /// `Other` components need a name; use [`Component::named`] for those.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self::named(kind.name().unwrap_or("X-UNKNOWN"))
    }

    /// Creates an empty component from a document name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            kind: ComponentKind::parse(name),
            name: name.to_ascii_uppercase(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn event() -> Self {
        Self::new(ComponentKind::Event)
    }

    pub fn add_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    pub fn add_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// First property called `name`, ignoring case.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.get_property(name)?.as_text()
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.text(names::UID)
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.text(names::SUMMARY)
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.text(names::DESCRIPTION)
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.text(names::STATUS)
    }

    pub fn children_of_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &Self> {
        self.children.iter().filter(move |c| c.kind == kind)
    }
}

/// A whole calendar document rooted at its VCALENDAR.
#[derive(Debug, Clone, PartialEq)]
pub struct ICalendar {
    pub root: Component,
}

impl ICalendar {
    /// ## Summary
    /// Starts a version 2.0 document with the given PRODID.
    #[must_use]
    pub fn new(prodid: impl Into<String>) -> Self {
        let mut root = Component::new(ComponentKind::Calendar);
        root.add_property(Property::text(names::VERSION, "2.0"));
        root.add_property(Property::text(names::PRODID, prodid));
        Self { root }
    }

    #[must_use]
    pub fn prodid(&self) -> Option<&str> {
        self.root.text(names::PRODID)
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.root.text(names::VERSION)
    }

    pub fn add_event(&mut self, event: Component) {
        self.root.add_child(event);
    }

    /// Top-level VEVENTs in document order.
    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.root.children_of_kind(ComponentKind::Event).collect()
    }
}

impl Default for ICalendar {
    fn default() -> Self {
        Self::new(stayline_core::constants::FEED_PRODID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_ignore_case_and_keep_unknown_names() {
        assert_eq!(ComponentKind::parse("vevent"), ComponentKind::Event);
        assert_eq!(ComponentKind::parse("VTODO"), ComponentKind::Other);

        let todo = Component::named("vtodo");
        assert_eq!(todo.kind, ComponentKind::Other);
        assert_eq!(todo.name, "VTODO");
    }

    #[test]
    fn new_calendar_carries_version_and_prodid() {
        let ical = ICalendar::new("-//Stayline//Test//EN");
        assert_eq!(ical.version(), Some("2.0"));
        assert_eq!(ical.prodid(), Some("-//Stayline//Test//EN"));
        assert!(ical.events().is_empty());
    }

    #[test]
    fn event_accessors_read_text_properties() {
        let mut event = Component::event();
        event.add_property(Property::text("UID", "booking-123"));
        event.add_property(Property::text("summary", "Reserved"));
        event.add_property(Property::text("STATUS", "CONFIRMED"));

        assert_eq!(event.uid(), Some("booking-123"));
        assert_eq!(event.summary(), Some("Reserved"));
        assert_eq!(event.status(), Some("CONFIRMED"));
        assert_eq!(event.description(), None);
    }

    #[test]
    fn events_skip_other_components() {
        let mut ical = ICalendar::default();
        ical.add_event(Component::event());
        ical.root.add_child(Component::new(ComponentKind::Timezone));
        ical.add_event(Component::event());

        assert_eq!(ical.events().len(), 2);
    }
}

//! iCalendar core models (RFC 5545).
//!
//! The component tree keeps unknown properties and parameters so that a
//! parsed feed can be inspected without losing information, while the value
//! types resolve the handful of date forms booking feeds actually use.

mod component;
mod parameter;
mod property;
mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use parameter::Parameter;
pub use property::{ContentLine, Property, names};
pub use value::{DateTime, DateTimeForm, Value};

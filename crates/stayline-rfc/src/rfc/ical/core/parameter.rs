//! Property parameters such as `VALUE=DATE` or `TZID=Asia/Bangkok`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Upper-cased name.
    pub name: String,
    /// Unquoted values; comma-separated lists keep one entry per item.
    pub values: Vec<String>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_values(name, vec![value.into()])
    }

    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// First value; booking feeds never use lists for the parameters the
    /// engine reads.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    #[must_use]
    pub fn tzid(tzid: impl Into<String>) -> Self {
        Self::new("TZID", tzid)
    }

    #[must_use]
    pub fn value_type(value_type: impl Into<String>) -> Self {
        Self::new("VALUE", value_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_upper_cased() {
        let param = Parameter::new("value", "DATE");
        assert_eq!(param.name, "VALUE");
        assert_eq!(param.value(), Some("DATE"));
    }

    #[test]
    fn lists_expose_their_first_value() {
        let param = Parameter::with_values("x-list", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(param.value(), Some("a"));
        assert_eq!(param.values.len(), 2);
    }
}

use std::fmt;

/// Opaque sender/recipient token handed over by the protocol adapter.
///
/// The host never looks inside `id`; it is only compared against the
/// configured master and passed back to the protocol on delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub id: String,
    pub name: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefers_name() {
        let plain = Identity::new("me@example.org");
        assert_eq!(plain.to_string(), "me@example.org");

        let named = Identity::new("me@example.org").with_name("Me");
        assert_eq!(named.to_string(), "Me");
        assert_eq!(named.as_str(), "me@example.org");
    }

    #[test]
    fn equality_includes_display_name() {
        assert_ne!(Identity::new("a"), Identity::new("a").with_name("A"));
        assert_eq!(Identity::from("a"), Identity::new(String::from("a")));
    }
}

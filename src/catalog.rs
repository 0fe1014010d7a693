use std::fmt;

/// Play names offered before anything has been tagged.
pub const DEFAULT_PLAYS: [&str; 5] = [
    "Pick & Roll",
    "Isolation",
    "Post Up",
    "Transition",
    "Spot Up",
];

/// Returned when registering a play name that is already in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePlayError {
    pub name: String,
}

impl fmt::Display for DuplicatePlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "play '{}' is already registered", self.name)
    }
}

impl std::error::Error for DuplicatePlayError {}

/// A play name with surrounding whitespace removed, or `None` if blank.
pub fn clean_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Ordered set of selectable play names.
///
/// Names match exactly (case-sensitive). The catalog only feeds selection;
/// metrics are derived from recorded events alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayCatalog {
    plays: Vec<String>,
}

impl PlayCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from seed names. Names are trimmed; blank names and
    /// repeats are skipped with a warning.
    pub fn with_plays<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for name in names {
            let Some(name) = clean_name(name.as_ref()) else {
                tracing::warn!("skipping blank play name in catalog seed");
                continue;
            };
            if let Err(e) = catalog.add(name) {
                tracing::warn!(error = %e, "skipping repeated play in catalog seed");
            }
        }
        catalog
    }

    /// Register a new play name. Fails without changing the catalog if the
    /// name already exists.
    pub fn add(&mut self, name: impl Into<String>) -> Result<(), DuplicatePlayError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(DuplicatePlayError { name });
        }
        self.plays.push(name);
        Ok(())
    }

    /// Register `name` if unseen. Returns true when it was added.
    pub fn ensure(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.plays.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plays.iter().any(|p| p == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.plays.iter().map(String::as_str)
    }

    #[cfg_attr(not(feature = "serve"), allow(dead_code))]
    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }
}

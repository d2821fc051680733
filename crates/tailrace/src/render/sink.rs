use serde::Deserialize;

use tailrace_core::draw::ArrowDirection;

/// Settings for the sink arrow rule.
///
/// Flows into storage-like destinations (dams, tailings storage facilities,
/// reservoirs) always show their incoming arrowhead, so a reader can tell at
/// a glance where water accumulates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    enabled: bool,
    fragments: Vec<String>,
}

impl SinkConfig {
    pub fn new(enabled: bool, fragments: Vec<String>) -> Self {
        Self { enabled, fragments }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::new(
            true,
            ["dam", "tsf", "reservoir"].map(str::to_string).to_vec(),
        )
    }
}

/// Decides whether a destination label names a sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinkPolicy {
    /// Lowercased name fragments; empty when the rule is off.
    fragments: Vec<String>,
}

impl SinkPolicy {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fragments: fragments
                .into_iter()
                .map(|fragment| fragment.as_ref().to_lowercase())
                .filter(|fragment| !fragment.is_empty())
                .collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.fragments.is_empty()
    }

    /// Case-insensitive substring match against every fragment.
    pub fn is_sink(&self, label: &str) -> bool {
        if self.fragments.is_empty() {
            return false;
        }
        let label = label.to_lowercase();
        self.fragments.iter().any(|fragment| label.contains(fragment.as_str()))
    }

    /// Arrowheads for an edge, given its own direction and the label of its
    /// destination node, if it ends on one.
    ///
    /// Flows into a sink point inward only: a bidirectional edge ending on a
    /// sink is drawn with its destination arrowhead alone.
    pub fn arrow_direction(&self, own: ArrowDirection, destination: Option<&str>) -> ArrowDirection {
        match destination {
            Some(label) if self.is_sink(label) => ArrowDirection::Forward,
            _ => own,
        }
    }
}

impl From<&SinkConfig> for SinkPolicy {
    fn from(config: &SinkConfig) -> Self {
        if config.enabled {
            Self::with_fragments(&config.fragments)
        } else {
            Self::disabled()
        }
    }
}

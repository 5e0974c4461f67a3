//! Supported PDU models.

use indexmap::IndexSet;

/// Part numbers of the models known to work with this tool.
pub const BUILTIN_PART_NUMBERS: [&str; 5] = ["EILB13", "EILB14", "EILB15", "EMIH28", "EMAB04"];

/// Set of supported part numbers.
///
/// Identity discovery refuses devices whose part number is not listed here.
/// Matching is exact and case-sensitive. Iteration follows registration order.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    part_numbers: IndexSet<String>,
}

impl ModelRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            part_numbers: IndexSet::new(),
        }
    }

    /// Create a registry with the built-in models.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for part_number in BUILTIN_PART_NUMBERS {
            registry.register(part_number);
        }
        registry
    }

    /// Register a part number. Returns `false` if it was already present.
    pub fn register(&mut self, part_number: impl Into<String>) -> bool {
        self.part_numbers.insert(part_number.into())
    }

    /// Check if a part number is supported.
    pub fn contains(&self, part_number: &str) -> bool {
        self.part_numbers.contains(part_number)
    }

    /// List all supported part numbers.
    pub fn part_numbers(&self) -> impl Iterator<Item = &str> {
        self.part_numbers.iter().map(String::as_str)
    }

    /// Number of supported models.
    pub fn len(&self) -> usize {
        self.part_numbers.len()
    }

    /// Check if no model is supported.
    pub fn is_empty(&self) -> bool {
        self.part_numbers.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

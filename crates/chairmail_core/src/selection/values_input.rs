//! Comma-joined id list mirrored into a form field.

/// Ordered, duplicate-free string values with a comma-joined form value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuesInput {
    values: Vec<String>,
}

impl ValuesInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a form value such as `"1,5,7"`; empty items are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut input = Self::new();
        for value in raw.trim().split(',') {
            let value = value.trim();
            if !value.is_empty() {
                input.add(value);
            }
        }
        input
    }

    /// Appends `value` unless already present. Returns whether it was added.
    pub fn add(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.has(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Removes `value` if present. Returns whether it was removed.
    pub fn remove(&mut self, value: &str) -> bool {
        match self.values.iter().position(|item| item == value) {
            Some(index) => {
                self.values.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has(&self, value: &str) -> bool {
        self.values.iter().any(|item| item == value)
    }

    pub fn all(&self) -> &[String] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Form field value.
    pub fn value(&self) -> String {
        self.values.join(",")
    }
}

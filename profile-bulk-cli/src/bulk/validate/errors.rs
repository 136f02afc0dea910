//! Per-row error accumulation

/// Errors gathered while validating one row.
///
/// Validation never short-circuits: every failing field adds its messages,
/// and the collector is merged into the row result once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCollector {
    errors: Vec<String>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, messages: I) {
        self.errors.extend(messages);
    }

    /// Append another collector's errors after this one's
    pub fn merge(&mut self, other: ErrorCollector) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_in_order() {
        let mut identity = ErrorCollector::new();
        identity.push("The Email provided is Invalid");

        let mut fields = ErrorCollector::new();
        fields.push("Invalid Full Name");
        fields.extend(vec!["Invalid Tag".to_string()]);

        identity.merge(fields);
        assert_eq!(identity.len(), 3);
        assert_eq!(
            identity.into_vec(),
            vec!["The Email provided is Invalid", "Invalid Full Name", "Invalid Tag"]
        );
    }
}

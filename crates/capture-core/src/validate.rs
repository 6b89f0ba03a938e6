//! Semantic validation of decoded entries.
//!
//! Validation is exhaustive: every rule runs and every failure is collected,
//! so a client sees all problems with a submission at once. Each message is
//! prefixed with the dotted path of the offending field, for example
//! `entrant.title is a required field` or `form[2].value is a required field`.

/// Accumulated validation failures, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<String>);

impl Violations {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message verbatim.
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Records a missing required field at `path`.
    pub fn required(&mut self, path: &str) {
        self.push(format!("{path} is a required field"));
    }

    /// Checks that `value` is non-empty, recording a violation otherwise.
    pub fn require_non_empty(&mut self, prefix: &str, field: &str, value: &str) {
        if value.is_empty() {
            self.required(&join(prefix, field));
        }
    }

    /// Returns true when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrows the recorded messages.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consumes the collection into its messages.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Joins a path prefix and a field name with a dot.
#[must_use]
pub fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

/// Types that can check their own semantic rules.
///
/// Implementors only write [`Validate::validate_into`]; the provided methods
/// build on it. Validation never mutates the value, so calling it twice
/// yields the same result.
pub trait Validate {
    /// Appends every violation found in `self` to `out`, prefixing paths
    /// with `path`.
    fn validate_into(&self, path: &str, out: &mut Violations);

    /// Validates from the root path.
    fn validate(&self) -> Result<(), Violations> {
        let mut out = Violations::new();
        self.validate_into("", &mut out);
        if out.is_empty() {
            Ok(())
        } else {
            Err(out)
        }
    }

    /// Returns true when there are no violations.
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

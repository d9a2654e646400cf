/// Facts the caller already knows and the payload may lack.
///
/// Adapters consult the context only when the payload itself does not carry the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceContext {
    repository: Option<String>,
    period_days: Option<u32>,
}

impl SourceContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The `owner/name` of the repository the payload belongs to.
    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// The length of the period an activity payload covers.
    #[must_use]
    pub const fn with_period_days(mut self, period_days: u32) -> Self {
        self.period_days = Some(period_days);
        self
    }

    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    #[must_use]
    pub const fn period_days(&self) -> Option<u32> {
        self.period_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let ctx = SourceContext::new();
        assert_eq!(ctx.repository(), None);
        assert_eq!(ctx.period_days(), None);
    }

    #[test]
    fn test_builder() {
        let ctx = SourceContext::new().with_repository("o/r").with_period_days(14);
        assert_eq!(ctx.repository(), Some("o/r"));
        assert_eq!(ctx.period_days(), Some(14));
    }
}

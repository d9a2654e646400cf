/// A key was rejected because it does not follow the naming discipline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid key '{key}': keys must start with an uppercase letter followed by uppercase letters, digits or underscores")]
pub struct InvalidKeyError {
    key: String,
}

impl InvalidKeyError {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

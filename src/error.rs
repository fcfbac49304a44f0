use thiserror::Error;

use crate::tab_data::TabId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Native API error: {0}")]
    NativeApi(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid storage format: {0}")]
    InvalidStorageFormat(String),

    #[error("Tab {0:?} has no URL")]
    MissingTabUrl(Option<TabId>),

    #[error("Tab has no id")]
    MissingTabId,
}

/// Convenience type alias for Results with Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NativeApi("No tab with id: 4".to_string());
        assert_eq!(err.to_string(), "Native API error: No tab with id: 4");

        let err = Error::InvalidStorageFormat("expected an object".to_string());
        assert_eq!(err.to_string(), "Invalid storage format: expected an object");

        assert_eq!(Error::MissingTabUrl(Some(3)).to_string(), "Tab Some(3) has no URL");
        assert_eq!(Error::MissingTabId.to_string(), "Tab has no id");
    }
}

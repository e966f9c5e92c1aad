//! Error types for popmenu.

use thiserror::Error;

/// Configuration errors raised synchronously by menu setup.
///
/// Runtime conditions such as opening a trigger without a menu or closing an
/// already-closed menu are silent no-ops and never produce an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    /// Assigning the panel would make it its own ancestor.
    #[error("menu {panel} cannot contain a trigger that opens itself")]
    RecursiveMenu {
        /// Id of the panel that was rejected.
        panel: String,
    },

    /// Unknown horizontal position value.
    #[error("invalid x-position '{0}': expected 'before' or 'after'")]
    InvalidXPosition(String),

    /// Unknown vertical position value.
    #[error("invalid y-position '{0}': expected 'above' or 'below'")]
    InvalidYPosition(String),

    /// Menu defaults could not be parsed.
    #[error("invalid menu configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for MenuError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursive_menu_message() {
        let err = MenuError::RecursiveMenu {
            panel: "menu-panel-3".to_string(),
        };
        assert!(err.to_string().contains("menu-panel-3"));
        assert!(err.to_string().contains("opens itself"));
    }

    #[test]
    fn test_invalid_position_messages() {
        let x = MenuError::InvalidXPosition("middle".to_string());
        assert_eq!(
            x.to_string(),
            "invalid x-position 'middle': expected 'before' or 'after'"
        );

        let y = MenuError::InvalidYPosition("left".to_string());
        assert!(y.to_string().contains("'above' or 'below'"));
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = MenuError::from(json_err);
        assert!(matches!(err, MenuError::InvalidConfig(_)));
        assert!(err.to_string().starts_with("invalid menu configuration"));
    }
}

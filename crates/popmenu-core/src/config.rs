//! Application-wide menu defaults.
//!
//! Every panel copies these values at construction; hosts override them per
//! panel afterwards. Defaults can be loaded from JSON:
//!
//! ```
//! use popmenu_core::{MenuDefaultOptions, XPosition};
//!
//! let options = MenuDefaultOptions::from_json(r#"{ "x_position": "before" }"#).unwrap();
//! assert_eq!(options.x_position, XPosition::Before);
//! assert!(options.restore_focus);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MenuError;
use crate::overlay::DEFAULT_BACKDROP_CLASS;

/// Highest elevation level a panel can reach.
pub const MAX_ELEVATION: u32 = 24;

/// Preferred horizontal side of the panel relative to its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum XPosition {
    /// Open toward the start edge.
    Before,
    /// Open toward the end edge.
    #[default]
    After,
}

impl XPosition {
    /// Name used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl FromStr for XPosition {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            other => Err(MenuError::InvalidXPosition(other.to_string())),
        }
    }
}

impl TryFrom<String> for XPosition {
    type Error = MenuError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<XPosition> for String {
    fn from(value: XPosition) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for XPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preferred vertical side of the panel relative to its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum YPosition {
    /// Open upward.
    Above,
    /// Open downward.
    #[default]
    Below,
}

impl YPosition {
    /// Name used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
        }
    }
}

impl FromStr for YPosition {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "above" => Ok(Self::Above),
            "below" => Ok(Self::Below),
            other => Err(MenuError::InvalidYPosition(other.to_string())),
        }
    }
}

impl TryFrom<String> for YPosition {
    type Error = MenuError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YPosition> for String {
    fn from(value: YPosition) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for YPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defaults applied to every menu panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuDefaultOptions {
    /// Horizontal side the panel opens toward.
    pub x_position: XPosition,
    /// Vertical side the panel opens toward.
    pub y_position: YPosition,
    /// Whether the panel covers its trigger.
    pub overlap_trigger: bool,
    /// Backdrop override. `None` lets the trigger decide.
    pub has_backdrop: Option<bool>,
    /// Class for the overlay backdrop.
    pub backdrop_class: String,
    /// Extra classes for the overlay pane.
    pub overlay_panel_class: Vec<String>,
    /// Elevation of a top-level panel.
    pub base_elevation: u32,
    /// Return focus to the trigger when a menu closes.
    pub restore_focus: bool,
}

impl Default for MenuDefaultOptions {
    fn default() -> Self {
        Self {
            x_position: XPosition::After,
            y_position: YPosition::Below,
            overlap_trigger: false,
            has_backdrop: None,
            backdrop_class: DEFAULT_BACKDROP_CLASS.to_string(),
            overlay_panel_class: Vec::new(),
            base_elevation: 8,
            restore_focus: true,
        }
    }
}

impl MenuDefaultOptions {
    /// Parse defaults from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, MenuError> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        // Surface position errors with their own variants.
        if let Some(x) = value.get("x_position").and_then(serde_json::Value::as_str) {
            x.parse::<XPosition>()?;
        }
        if let Some(y) = value.get("y_position").and_then(serde_json::Value::as_str) {
            y.parse::<YPosition>()?;
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Set the horizontal side.
    #[must_use]
    pub const fn with_x_position(mut self, x: XPosition) -> Self {
        self.x_position = x;
        self
    }

    /// Set the vertical side.
    #[must_use]
    pub const fn with_y_position(mut self, y: YPosition) -> Self {
        self.y_position = y;
        self
    }

    /// Set trigger overlap.
    #[must_use]
    pub const fn with_overlap_trigger(mut self, overlap: bool) -> Self {
        self.overlap_trigger = overlap;
        self
    }

    /// Force a backdrop on or off.
    #[must_use]
    pub const fn with_backdrop(mut self, has_backdrop: bool) -> Self {
        self.has_backdrop = Some(has_backdrop);
        self
    }

    /// Set focus restoration.
    #[must_use]
    pub const fn with_restore_focus(mut self, restore: bool) -> Self {
        self.restore_focus = restore;
        self
    }
}

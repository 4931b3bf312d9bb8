//! Editing tool selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Editing tool selection.
///
/// The active tool determines what a primary-button press on empty canvas
/// produces. Flat enumeration with no sub-states: tools only change through an
/// explicit [`crate::DocumentStore::set_tool`], never automatically after an
/// action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    /// Pick and move existing overlays; pressing empty canvas clears selection
    #[default]
    Select,
    /// Place a text box and open it for typing
    Text,
    /// Place the previously chosen image asset
    Image,
    /// Place a highlight annotation
    Annotate,
    /// Place a rectangle shape
    Shape,
    /// Place a text form field
    Form,
    /// Place the previously chosen signature asset
    Sign,
    /// Page-level operations (handled outside the engine)
    Page,
}

impl Tool {
    pub const ALL: [Tool; 8] = [
        Tool::Select,
        Tool::Text,
        Tool::Image,
        Tool::Annotate,
        Tool::Shape,
        Tool::Form,
        Tool::Sign,
        Tool::Page,
    ];

    /// Whether placing with this tool needs an asset chosen beforehand.
    pub fn requires_asset(self) -> bool {
        matches!(self, Tool::Image | Tool::Sign)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Text => "Text",
            Tool::Image => "Image",
            Tool::Annotate => "Annotate",
            Tool::Shape => "Shape",
            Tool::Form => "Form",
            Tool::Sign => "Sign",
            Tool::Page => "Page",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tool '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_tool_is_select() {
        assert_eq!(Tool::default(), Tool::Select);
    }

    #[test]
    fn parses_tool_names_case_insensitively() {
        assert_eq!("sign".parse::<Tool>().unwrap(), Tool::Sign);
        assert_eq!(" Text ".parse::<Tool>().unwrap(), Tool::Text);
        assert!("lasso".parse::<Tool>().is_err());
    }

    #[test]
    fn only_image_and_sign_need_assets() {
        let needing: Vec<_> = Tool::ALL
            .into_iter()
            .filter(|tool| tool.requires_asset())
            .collect();
        assert_eq!(needing, [Tool::Image, Tool::Sign]);
    }
}

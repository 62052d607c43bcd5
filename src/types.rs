//! Shared types used by the normalizer, the batch orchestrator and the
//! JSON report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_width_by_height() {
        assert_eq!(Dimensions::new(2048, 1536).to_string(), "2048x1536");
    }

    #[test]
    fn serializes_as_object() {
        let json = serde_json::to_string(&Dimensions::new(4, 8)).unwrap();
        assert_eq!(json, r#"{"width":4,"height":8}"#);
    }
}

use std::borrow::Cow;
use std::fmt;

use serde::Deserialize;

/// A CSS colour string such as `#8b0000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub struct Color(Cow<'static, str>);

impl Color {
    pub const OXBLOOD: Color = Color(Cow::Borrowed("#8b0000"));
    pub const GOLD: Color = Color(Cow::Borrowed("#d4af37"));
    pub const WHITE: Color = Color(Cow::Borrowed("#ffffff"));
    pub const SILVER: Color = Color(Cow::Borrowed("#cccccc"));
    pub const MOTE: Color = Color(Cow::Borrowed("rgba(255, 255, 255, 0.3)"));

    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const AMBIENT_PALETTE: [Color; 4] = [Color::GOLD, Color::OXBLOOD, Color::WHITE, Color::SILVER];

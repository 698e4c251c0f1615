//! Core data types for rendering preferences and errors.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Dark mode preference.
///
/// `Unset` is not the same as `Off`: an unset preference renders with an
/// explicit white background, while `Off` only sets a black foreground.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DarkMode {
    On,
    Off,
    #[default]
    Unset,
}

impl DarkMode {
    pub fn from_option(value: Option<bool>) -> Self {
        match value {
            Some(true) => DarkMode::On,
            Some(false) => DarkMode::Off,
            None => DarkMode::Unset,
        }
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            DarkMode::On => Some(true),
            DarkMode::Off => Some(false),
            DarkMode::Unset => None,
        }
    }

    pub fn is_set(self) -> bool {
        !matches!(self, DarkMode::Unset)
    }
}

impl Serialize for DarkMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DarkMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<bool>::deserialize(deserializer).map(DarkMode::from_option)
    }
}

/// LaTeX font size switch used for rendering.
///
/// Identifiers are case-sensitive: `large` and `LARGE` are different sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontSize {
    #[serde(rename = "tiny")]
    Tiny,
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "large")]
    Large,
    #[serde(rename = "LARGE")]
    ExtraLarge,
    #[serde(rename = "huge")]
    Huge,
}

impl FontSize {
    /// All sizes, smallest first.
    pub const ALL: [FontSize; 5] = [
        FontSize::Tiny,
        FontSize::Small,
        FontSize::Large,
        FontSize::ExtraLarge,
        FontSize::Huge,
    ];

    /// Size used when no preference is set.
    pub const DEFAULT: FontSize = FontSize::Small;

    /// The LaTeX identifier, without the leading backslash.
    pub fn ident(self) -> &'static str {
        match self {
            FontSize::Tiny => "tiny",
            FontSize::Small => "small",
            FontSize::Large => "large",
            FontSize::ExtraLarge => "LARGE",
            FontSize::Huge => "huge",
        }
    }

    /// Human-readable label shown by clients.
    pub fn label(self) -> &'static str {
        match self {
            FontSize::Tiny => "Tiny",
            FontSize::Small => "Small",
            FontSize::Large => "Large",
            FontSize::ExtraLarge => "LARGE",
            FontSize::Huge => "Huge",
        }
    }

    /// Parse an identifier. Anything outside the five known sizes is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.ident() == value)
    }

    pub fn idents() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.ident()).collect()
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.label()).collect()
    }
}

impl std::fmt::Display for FontSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ident())
    }
}

/// Resolved rendering preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub dark_mode: DarkMode,
    pub font_size: Option<FontSize>,
}

impl Preferences {
    pub fn new(dark_mode: DarkMode, font_size: Option<FontSize>) -> Self {
        Self {
            dark_mode,
            font_size,
        }
    }
}

/// Errors that can occur while negotiating preferences or rendering.
#[derive(thiserror::Error, Debug)]
pub enum LatexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{reason} ({code})")]
    Status { code: u16, reason: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image too large: {size} bytes exceeds {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("Failed to persist preferences: {0}")]
    Persistence(String),

    #[error("Elicitation failed: {0}")]
    Elicitation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LatexError {
    /// Whether this error came out of the render pipeline.
    pub fn is_render_failure(&self) -> bool {
        matches!(
            self,
            LatexError::Http(_)
                | LatexError::Status { .. }
                | LatexError::Image(_)
                | LatexError::TooLarge { .. }
        )
    }
}

/// Convenience result type.
pub type LatexResult<T> = Result<T, LatexError>;

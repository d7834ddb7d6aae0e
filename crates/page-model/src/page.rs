//! Page snapshots and the element descriptors inside them.

use serde::{Deserialize, Serialize};

/// Viewport dimensions in CSS pixels at extraction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }
}

/// Viewport-relative bounding box of one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Corner form `[x0, y0, x1, y1]`, the shape detector boxes arrive in.
    pub fn corners(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Vertical page region an element was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRegion {
    Header,
    Main,
    Footer,
    Navigation,
}

impl Default for PageRegion {
    fn default() -> Self {
        Self::Main
    }
}

/// One candidate UI element as reported by the live page.
///
/// The `visible`/`clickable`/`interactive` flags are derived in the page
/// itself at extraction time; callers never set them. `visible = true`
/// means non-zero rendered area, no display/visibility/opacity hiding and
/// an unbroken chain of rendered ancestors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    /// Lowercase tag name, e.g. "button".
    pub tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,

    /// Trimmed text content.
    #[serde(default)]
    pub text: String,

    /// `name` attribute, where present (form inputs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `type` attribute for inputs, e.g. "text".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default)]
    pub bounds: ElementBounds,

    #[serde(default)]
    pub visible: bool,

    #[serde(default)]
    pub clickable: bool,

    #[serde(default)]
    pub interactive: bool,

    /// Composite centrality/size/font weight from the visual survey;
    /// absent on the structural path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_importance: Option<f64>,

    #[serde(default)]
    pub region: PageRegion,
}

impl ElementDescriptor {
    /// Short human-readable label for logs and prompt summaries.
    pub fn label(&self) -> String {
        let mut out = self.tag.clone();
        if let Some(id) = &self.id {
            out.push('#');
            out.push_str(id);
        }
        let text = self.text.trim();
        if !text.is_empty() {
            let short: String = text.chars().take(40).collect();
            out.push_str(" \"");
            out.push_str(&short);
            out.push('"');
        } else if let Some(aria) = &self.aria_label {
            out.push_str(" [");
            out.push_str(aria);
            out.push(']');
        }
        out
    }

    /// Best text to match a target description against: content text,
    /// falling back to the accessible label.
    pub fn match_text(&self) -> &str {
        let text = self.text.trim();
        if !text.is_empty() {
            return text;
        }
        self.aria_label.as_deref().unwrap_or("")
    }
}

/// Snapshot of a loaded page at one instant.
///
/// Created fresh on every extraction, immutable once returned, superseded
/// by the next extraction; never carried across loop iterations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub interactive_elements: Vec<ElementDescriptor>,

    #[serde(default)]
    pub navigation_elements: Vec<ElementDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_content: Option<ElementDescriptor>,

    /// Flattened visible text, whitespace-normalized.
    #[serde(default)]
    pub visible_text: String,

    #[serde(default)]
    pub viewport: Viewport,
}

impl PageState {
    /// Empty snapshot for a URL; what extraction yields when every page
    /// query fails.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.interactive_elements.is_empty()
            && self.navigation_elements.is_empty()
            && self.visible_text.is_empty()
    }

    /// All scoreable candidates in extraction order: interactive first,
    /// then navigation.
    pub fn candidates(&self) -> impl Iterator<Item = &ElementDescriptor> {
        self.interactive_elements
            .iter()
            .chain(self.navigation_elements.iter())
    }
}

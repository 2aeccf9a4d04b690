//! HTML page template for rendered captures.

use crate::{DashError, DashResult};

/// Marker replaced by the rendered capture.
pub const CONTENT_MARKER: &str = "CONTENT";
/// Marker replaced by the stylesheet text.
pub const STYLESHEET_MARKER: &str = "STYLESHEET";

/// Stylesheet embedded into every page.
pub const TERMINAL_CSS: &str = include_str!("../../assets/terminal.css");

const PREVIEW_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Build log</title>
<style>STYLESHEET</style>
</head>
<body>
<div class="term-container">CONTENT</div>
</body>
</html>
"#;

/// A page template pre-split around the content marker, with the
/// stylesheet already substituted.
///
/// Each marker is substituted once. The rendered fragment is never scanned
/// for markers, so capture text containing `STYLESHEET` stays intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    head: String,
    tail: String,
}

impl PageTemplate {
    pub fn new(template: &str, stylesheet: &str) -> DashResult<Self> {
        let (head, tail) = template.split_once(CONTENT_MARKER).ok_or_else(|| {
            DashError::Message(format!("page template has no {CONTENT_MARKER} marker"))
        })?;

        let (head, tail) = if head.contains(STYLESHEET_MARKER) {
            (head.replacen(STYLESHEET_MARKER, stylesheet, 1), tail.to_string())
        } else if tail.contains(STYLESHEET_MARKER) {
            (head.to_string(), tail.replacen(STYLESHEET_MARKER, stylesheet, 1))
        } else {
            return Err(DashError::Message(format!(
                "page template has no {STYLESHEET_MARKER} marker"
            )));
        };

        Ok(PageTemplate { head, tail })
    }

    /// Wrap a rendered fragment into a full HTML document.
    pub fn splice(&self, fragment: &[u8]) -> Vec<u8> {
        let mut page = Vec::with_capacity(self.head.len() + fragment.len() + self.tail.len());
        page.extend_from_slice(self.head.as_bytes());
        page.extend_from_slice(fragment);
        page.extend_from_slice(self.tail.as_bytes());
        page
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        PageTemplate::new(PREVIEW_TEMPLATE, TERMINAL_CSS)
            .expect("builtin template has both markers")
    }
}

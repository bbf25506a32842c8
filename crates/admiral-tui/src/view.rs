//! View definitions and responsive layout mode.
//!
//! A view is identified by a string id. Its [`ViewDefinition`] lists the
//! panels that take keyboard focus in order, the view reached by `enter`,
//! and the function that renders it.

use std::fmt;

use crate::shell::AppShell;

/// Render capability injected by the rendering layer.
pub type RenderFn = Box<dyn Fn(&AppShell) -> String>;

/// Per-view configuration.
#[derive(Default)]
pub struct ViewDefinition {
    focus_order: Vec<String>,
    enter_target: Option<String>,
    render: Option<RenderFn>,
}

impl ViewDefinition {
    /// An empty definition: no focusable panels, no enter target, no renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the focusable panels, in `tab` order.
    pub fn focus_order<I, S>(mut self, panels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focus_order = panels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the view pushed when `enter` is pressed with no overlay open.
    pub fn enter_target(mut self, view: impl Into<String>) -> Self {
        self.enter_target = Some(view.into());
        self
    }

    /// Set the render function.
    pub fn render(mut self, render: impl Fn(&AppShell) -> String + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    /// Focusable panels in order.
    pub fn panels(&self) -> &[String] {
        &self.focus_order
    }

    /// The `enter` target, if any.
    pub fn target(&self) -> Option<&str> {
        self.enter_target.as_deref()
    }

    pub(crate) fn renderer(&self) -> Option<&RenderFn> {
        self.render.as_ref()
    }
}

impl fmt::Debug for ViewDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewDefinition")
            .field("focus_order", &self.focus_order)
            .field("enter_target", &self.enter_target)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Layout mode based on terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Panels side by side.
    Standard,
    /// Panels stacked vertically.
    #[default]
    Compact,
}

impl LayoutMode {
    /// Compact below `compact_below` columns, standard at or above it.
    pub fn from_width(width: u16, compact_below: u16) -> Self {
        if width >= compact_below {
            LayoutMode::Standard
        } else {
            LayoutMode::Compact
        }
    }

    /// Short label for the header.
    pub fn label(&self) -> &'static str {
        match self {
            LayoutMode::Standard => "standard",
            LayoutMode::Compact => "compact",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_mode_boundary() {
        assert_eq!(LayoutMode::from_width(120, 120), LayoutMode::Standard);
        assert_eq!(LayoutMode::from_width(119, 120), LayoutMode::Compact);
    }

    #[test]
    fn test_layout_mode_extremes() {
        assert_eq!(LayoutMode::from_width(0, 120), LayoutMode::Compact);
        assert_eq!(LayoutMode::from_width(u16::MAX, 120), LayoutMode::Standard);
        assert_eq!(LayoutMode::from_width(80, 80), LayoutMode::Standard);
    }

    #[test]
    fn test_view_definition_builder() {
        let def = ViewDefinition::new()
            .focus_order(["agents", "missions"])
            .enter_target("mission")
            .render(|_| "fleet".to_string());
        assert_eq!(def.panels(), ["agents", "missions"]);
        assert_eq!(def.target(), Some("mission"));
        assert!(def.renderer().is_some());
        assert!(format!("{def:?}").contains("<fn>"));
    }
}

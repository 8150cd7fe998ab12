//! Hover and selection state of the globe.

/// Something under the pointer that has a tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    /// Index into the globe's `RegionSet`.
    Region(usize),
    Origin,
    Destination,
}

/// Raised by the globe for the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobeEvent {
    /// A region was clicked; carries its exact name.
    RegionSelected(String),
}

/// Single-slot tooltip. At most one value is shown at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tooltip {
    target: Option<HoverTarget>,
    text: Option<String>,
}

impl Tooltip {
    pub fn show(&mut self, target: HoverTarget, text: impl Into<String>) {
        self.target = Some(target);
        self.text = Some(text.into());
    }

    /// Clears the tooltip if it still belongs to `target`. A late `leave`
    /// from a previous target does not hide the current one.
    pub fn leave(&mut self, target: HoverTarget) {
        if self.target == Some(target) {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.text = None;
    }

    pub fn target(&self) -> Option<HoverTarget> {
        self.target
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::{HoverTarget, Tooltip};

    #[test]
    fn newer_hover_replaces_older() {
        let mut t = Tooltip::default();
        t.show(HoverTarget::Region(3), "France");
        t.show(HoverTarget::Origin, "JFK - New York");
        assert_eq!(t.text(), Some("JFK - New York"));

        // Leaving the region after entering the marker keeps the marker's text.
        t.leave(HoverTarget::Region(3));
        assert_eq!(t.target(), Some(HoverTarget::Origin));

        t.leave(HoverTarget::Origin);
        assert_eq!(t.text(), None);
    }
}

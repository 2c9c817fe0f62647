use serde::{Deserialize, Serialize};

/// Corner of the map container a control is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Position {
    /// Leaflet's name for the corner, as used in CSS classes
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::TopLeft => "topleft",
            Position::TopRight => "topright",
            Position::BottomLeft => "bottomleft",
            Position::BottomRight => "bottomright",
        }
    }
}

/// Ordered set of CSS class names, the way `classList` behaves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    classes: Vec<String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Space-separated names, empty entries skipped
    pub fn parse(names: &str) -> Self {
        let mut list = Self::new();
        list.add(names);
        list
    }

    /// Adds every space-separated name not already present
    pub fn add(&mut self, names: &str) {
        for name in names.split_whitespace() {
            if !self.contains(name) {
                self.classes.push(name.to_string());
            }
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.classes.retain(|c| c != name);
    }

    pub fn toggle(&mut self, name: &str, on: bool) {
        if on {
            self.add(name);
        } else {
            self.remove(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl std::fmt::Display for ClassList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.classes.join(" "))
    }
}

/// A clickable control element: its hover title, classes and enabled state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Button {
    pub title: String,
    pub classes: ClassList,
    pub disabled: bool,
}

impl Button {
    pub fn new(title: impl Into<String>, classes: &str) -> Self {
        Self {
            title: title.into(),
            classes: ClassList::parse(classes),
            disabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_behaves_like_dom() {
        let mut classes = ClassList::parse("  leaflet-control-boxzoom  with-background-image ");
        assert_eq!(classes.to_string(), "leaflet-control-boxzoom with-background-image");

        classes.add("leaflet-control-boxzoom extra");
        assert_eq!(classes.iter().count(), 3);

        classes.toggle("extra", false);
        assert!(!classes.contains("extra"));
        classes.remove("missing");
        assert_eq!(classes.iter().count(), 2);
    }

    #[test]
    fn test_position_names() {
        assert_eq!(Position::TopLeft.as_str(), "topleft");
        let parsed: Position = serde_json::from_str("\"bottomright\"").unwrap();
        assert_eq!(parsed, Position::BottomRight);
    }
}

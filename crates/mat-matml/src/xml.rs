//! Minimal XML element tree with an indented serializer.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Leaf element holding `text`.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).text(text)
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        write!(f, "{indent}<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {key}=\"{}\"", escape(value))?;
        }
        if self.children.is_empty() {
            return match &self.text {
                Some(text) => writeln!(f, ">{}</{}>", escape(text), self.name),
                None => writeln!(f, " />"),
            };
        }
        writeln!(f, ">")?;
        if let Some(text) = &self.text {
            writeln!(f, "{indent}  {}", escape(text))?;
        }
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        writeln!(f, "{indent}</{}>", self.name)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Serializes `root` with an XML declaration.
pub fn document(root: &Element) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{root}")
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_elements_with_indent() {
        let root = Element::new("Units")
            .child(Element::new("Unit").attr("power", "-3").child(Element::with_text("Name", "m")))
            .child(Element::new("Unitless"));
        assert_eq!(
            root.to_string(),
            "<Units>\n  <Unit power=\"-3\">\n    <Name>m</Name>\n  </Unit>\n  <Unitless />\n</Units>\n"
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let e = Element::with_text("Qualifier", "Young's Modulus & <more>").attr("name", "a\"b");
        assert_eq!(
            e.to_string(),
            "<Qualifier name=\"a&quot;b\">Young&apos;s Modulus &amp; &lt;more&gt;</Qualifier>\n"
        );
    }

    #[test]
    fn rendered_document_parses() {
        let root = Element::new("Root").child(Element::with_text("Name", "Poisson's Ratio"));
        let xml = document(&root);
        let doc = roxmltree::Document::parse(&xml).expect("well-formed");
        let name = doc.root_element().first_element_child().expect("child");
        assert_eq!(name.text(), Some("Poisson's Ratio"));
    }
}

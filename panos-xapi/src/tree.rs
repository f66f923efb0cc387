use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// An element of an API request or response document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Element tag name.
    pub tag: String,
    /// XML attributes keyed by name.
    pub attributes: BTreeMap<String, String>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
    /// Optional text content, untrimmed.
    pub text: Option<String>,
}

impl XmlNode {
    /// Create a new element with no attributes, children, or text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder: set an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder: set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: append a `<tag><member>..</member>..</tag>` list, the shape the
    /// firewall uses for every multi-valued config field.
    pub fn with_members<I, S>(self, tag: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = members
            .into_iter()
            .fold(XmlNode::new(tag), |list, member| {
                list.with_child(XmlNode::new("member").with_text(member))
            });
        self.with_child(list)
    }

    /// Return an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Return the first child with the provided tag.
    pub fn get_child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Return all children with the provided tag.
    pub fn get_children(&self, tag: &str) -> Vec<&XmlNode> {
        self.children
            .iter()
            .filter(|child| child.tag == tag)
            .collect()
    }

    /// Walk a nested child path and return the terminal node's trimmed text.
    pub fn get_text<'a>(&'a self, path: &[&str]) -> Option<&'a str> {
        let mut current = self;
        for segment in path {
            current = current.get_child(segment)?;
        }
        current.text.as_deref().map(str::trim)
    }

    /// Return the first descendant (depth-first, document order) with the tag.
    pub fn find(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find_map(|child| {
            if child.tag == tag {
                Some(child)
            } else {
                child.find(tag)
            }
        })
    }

    /// Return every descendant with the tag, in document order.
    ///
    /// Matches are not searched for nested matches of the same tag, so an
    /// `<entry>` inside another `<entry>` is reported once through its
    /// outermost ancestor.
    pub fn find_all(&self, tag: &str) -> Vec<&XmlNode> {
        let mut found = Vec::new();
        collect_descendants(self, tag, &mut found);
        found
    }

    /// Collect the trimmed, non-empty text of every node in this subtree.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_texts(self, &mut out);
        out
    }
}

fn collect_descendants<'a>(node: &'a XmlNode, tag: &str, found: &mut Vec<&'a XmlNode>) {
    for child in &node.children {
        if child.tag == tag {
            found.push(child);
        } else {
            collect_descendants(child, tag, found);
        }
    }
}

fn collect_texts<'a>(node: &'a XmlNode, out: &mut Vec<&'a str>) {
    if let Some(text) = node.text.as_deref() {
        let text = text.trim();
        if !text.is_empty() {
            out.push(text);
        }
    }
    for child in &node.children {
        collect_texts(child, out);
    }
}

impl Display for XmlNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, value)?;
        }

        if self.children.is_empty() && self.text.is_none() {
            return write!(f, "/>");
        }

        write!(f, ">")?;
        if let Some(text) = &self.text {
            write!(f, "{}", text)?;
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

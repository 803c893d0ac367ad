use super::{Document, NodeId};

/// The subset of CSS selectors the page components rely on:
/// `tag`, `*`, `#id`, `.class`, `[attr]`, `[attr=v]`, `[attr^=v]`,
/// descendant and child combinators, comma-separated lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

#[derive(Debug)]
pub struct SelectorError(pub String);

impl std::fmt::Display for SelectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid selector: {}", self.0)
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    // Rightmost compound last; each compound after the first carries the
    // combinator that links it to its predecessor.
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

#[derive(Debug, Clone, PartialEq)]
enum AttrTest {
    Exists(String),
    Equals(String, String),
    Prefix(String, String),
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        for part in split_top_level(input) {
            let part = part.trim();
            if part.is_empty() {
                return Err(SelectorError(format!("empty alternative in '{}'", input)));
            }
            alternatives.push(parse_complex(part)?);
        }
        if alternatives.is_empty() {
            return Err(SelectorError("empty selector".to_string()));
        }
        Ok(Selector { alternatives })
    }

    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        doc.is_element(id) && self.alternatives.iter().any(|c| c.matches(doc, id))
    }
}

// Commas inside brackets or quotes belong to attribute values.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                out.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&input[start..]);
    out
}

fn parse_complex(input: &str) -> Result<Complex, SelectorError> {
    let chars: Vec<char> = input.chars().collect();
    let mut parts = Vec::new();
    let mut pos = 0;
    let mut pending = Combinator::Descendant;

    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() {
            pos += 1;
            continue;
        }
        if c == '>' {
            if parts.is_empty() {
                return Err(SelectorError(format!("leading combinator in '{}'", input)));
            }
            pending = Combinator::Child;
            pos += 1;
            continue;
        }
        let (compound, next) = parse_compound(&chars, pos, input)?;
        parts.push((pending, compound));
        pending = Combinator::Descendant;
        pos = next;
    }

    if parts.is_empty() {
        return Err(SelectorError(format!("no compound in '{}'", input)));
    }
    if pending == Combinator::Child && chars.iter().rev().find(|c| !c.is_whitespace()) == Some(&'>') {
        return Err(SelectorError(format!("trailing combinator in '{}'", input)));
    }
    Ok(Complex { parts })
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], mut pos: usize) -> (String, usize) {
    let start = pos;
    while pos < chars.len() && is_ident(chars[pos]) {
        pos += 1;
    }
    (chars[start..pos].iter().collect(), pos)
}

fn parse_compound(chars: &[char], mut pos: usize, input: &str) -> Result<(Compound, usize), SelectorError> {
    let mut compound = Compound::default();
    let start = pos;

    if chars[pos] == '*' {
        pos += 1;
    } else if is_ident(chars[pos]) {
        let (tag, next) = read_ident(chars, pos);
        compound.tag = Some(tag.to_ascii_lowercase());
        pos = next;
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                let (id, next) = read_ident(chars, pos + 1);
                if id.is_empty() {
                    return Err(SelectorError(format!("empty id in '{}'", input)));
                }
                compound.id = Some(id);
                pos = next;
            }
            '.' => {
                let (class, next) = read_ident(chars, pos + 1);
                if class.is_empty() {
                    return Err(SelectorError(format!("empty class in '{}'", input)));
                }
                compound.classes.push(class);
                pos = next;
            }
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|off| pos + off)
                    .ok_or_else(|| SelectorError(format!("unclosed '[' in '{}'", input)))?;
                let body: String = chars[pos + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&body, input)?);
                pos = close + 1;
            }
            c if c.is_whitespace() || c == '>' => break,
            c => return Err(SelectorError(format!("unexpected '{}' in '{}'", c, input))),
        }
    }

    if pos == start {
        return Err(SelectorError(format!("unexpected '{}' in '{}'", chars[pos], input)));
    }
    Ok((compound, pos))
}

fn parse_attr(body: &str, input: &str) -> Result<AttrTest, SelectorError> {
    let unquote = |v: &str| -> String {
        let v = v.trim();
        v.strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| v.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .unwrap_or(v)
            .to_string()
    };

    if let Some((name, value)) = body.split_once("^=") {
        return Ok(AttrTest::Prefix(name.trim().to_string(), unquote(value)));
    }
    if let Some((name, value)) = body.split_once('=') {
        return Ok(AttrTest::Equals(name.trim().to_string(), unquote(value)));
    }
    let name = body.trim();
    if name.is_empty() {
        return Err(SelectorError(format!("empty attribute test in '{}'", input)));
    }
    Ok(AttrTest::Exists(name.to_string()))
}

impl Compound {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(tag) = doc.tag(id) else {
            return false;
        };
        if let Some(want) = &self.tag {
            if want != tag {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if doc.attr(id, "id") != Some(want.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| doc.has_class(id, c)) {
            return false;
        }
        self.attrs.iter().all(|test| match test {
            AttrTest::Exists(name) => doc.attr(id, name).is_some(),
            AttrTest::Equals(name, value) => doc.attr(id, name) == Some(value.as_str()),
            AttrTest::Prefix(name, value) => doc
                .attr(id, name)
                .map(|v| v.starts_with(value.as_str()))
                .unwrap_or(false),
        })
    }
}

impl Complex {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.matches_from(doc, id, self.parts.len() - 1)
    }

    fn matches_from(&self, doc: &Document, id: NodeId, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(doc, id) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => doc
                .parent(id)
                .map(|p| self.matches_from(doc, p, index - 1))
                .unwrap_or(false),
            Combinator::Descendant => {
                let mut cur = doc.parent(id);
                while let Some(ancestor) = cur {
                    if self.matches_from(doc, ancestor, index - 1) {
                        return true;
                    }
                    cur = doc.parent(ancestor);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let header = doc.element_with("header", "site-header", None);
        let nav = doc.create_element("nav");
        doc.set_attr(nav, "id", "primary");
        let a1 = doc.element_with("a", "nav-link", Some("Home"));
        doc.set_attr(a1, "href", "#home");
        let a2 = doc.element_with("a", "nav-link external", Some("Blog"));
        doc.set_attr(a2, "href", "https://blog.example.com");
        let button = doc.element_with("button", "", Some("Theme"));
        doc.append_child(body, header);
        doc.append_child(header, nav);
        doc.append_child(nav, a1);
        doc.append_child(nav, a2);
        doc.append_child(header, button);
        doc
    }

    #[test]
    fn test_prefix_attribute_inside_region() {
        let doc = page();
        let hits = doc.select("nav a[href^=\"#\"]").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(doc.text_content(hits[0]), "Home");
    }

    #[test]
    fn test_selector_list_keeps_document_order() {
        let doc = page();
        let hits = doc.select("button, a").unwrap();
        let texts: Vec<String> = hits.iter().map(|&h| doc.text_content(h)).collect();
        assert_eq!(texts, vec!["Home", "Blog", "Theme"]);
    }

    #[test]
    fn test_id_class_and_child_combinator() {
        let doc = page();
        assert_eq!(doc.select("#primary > .nav-link.external").unwrap().len(), 1);
        assert_eq!(doc.select("header > a").unwrap().len(), 0);
        assert_eq!(doc.select("header a").unwrap().len(), 2);
        assert_eq!(doc.select(".site-header").unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_malformed_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("a,").is_err());
        assert!(Selector::parse("a[href").is_err());
        assert!(Selector::parse("> a").is_err());
        assert!(Selector::parse("div.").is_err());
    }
}

//! Turning a [`Soup`] back into markup.
use std::fmt::{self, Display, Formatter, Write};

use crate::soup::{NodeData, NodeId};
use crate::utils::{is_raw_text_element, is_void_element};
use crate::Soup;

pub(crate) fn write_escaped<W: Write + ?Sized>(
    out: &mut W,
    text: &str,
    attribute: bool,
) -> fmt::Result {
    let mut rest = text;
    while let Some(index) = rest.find(|c: char| matches!(c, '&' | '<' | '>' | '"')) {
        out.write_str(&rest[..index])?;
        let c = rest.as_bytes()[index];
        match c {
            b'&' => out.write_str("&amp;")?,
            b'<' => out.write_str("&lt;")?,
            b'>' => out.write_str("&gt;")?,
            b'"' if attribute => out.write_str("&quot;")?,
            _ => out.write_char(char::from(c))?,
        }
        rest = &rest[index + 1..];
    }
    out.write_str(rest)
}

/// Text is only written verbatim if the tokenizer read it verbatim (decided by the name in the
/// markup) and it still ends up inside `<script>` or `<style>`. Everything else gets escaped.
fn is_raw_text_parent(soup: &Soup, id: NodeId) -> bool {
    let parent = match soup.get(id).parent() {
        Some(parent) => soup.get(parent),
        None => return false,
    };
    parent.is_raw_text()
        && parent
            .as_tag()
            .map_or(false, |tag| is_raw_text_element(&tag.name))
}

fn has_end_tag(soup: &Soup, id: NodeId, name: &str) -> bool {
    !is_void_element(name) || !soup.get(id).children().is_empty()
}

fn write_compact(f: &mut Formatter<'_>, soup: &Soup, id: NodeId) -> fmt::Result {
    match *soup.get(id).data() {
        NodeData::Document => {}
        NodeData::Doctype(ref name) => write!(f, "<!DOCTYPE {}>", name)?,
        NodeData::Comment(ref text) => write!(f, "<!--{}-->", text)?,
        NodeData::Text(ref text) if is_raw_text_parent(soup, id) => f.write_str(text)?,
        NodeData::Text(ref text) => write_escaped(f, text, false)?,
        NodeData::Element(ref tag) => write!(f, "{}", tag)?,
    }

    for &child in soup.get(id).children() {
        write_compact(f, soup, child)?;
    }

    if let Some(tag) = soup.get(id).as_tag() {
        if has_end_tag(soup, id, &tag.name) {
            write!(f, "</{}>", tag.name)?;
        }
    }

    Ok(())
}

impl Display for Soup {
    /// Serialize the document as compact HTML, without adding any whitespace.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_compact(f, self, self.root())
    }
}

/// Indented rendering of a [`Soup`], see [`Soup::prettify`].
#[derive(Debug, Clone, Copy)]
pub struct Pretty<'a>(&'a Soup);

fn indent(f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_char(' ')?;
    }
    Ok(())
}

fn write_pretty(f: &mut Formatter<'_>, soup: &Soup, id: NodeId, depth: usize) -> fmt::Result {
    let child_depth = match *soup.get(id).data() {
        NodeData::Document => depth,
        NodeData::Doctype(ref name) => {
            indent(f, depth)?;
            writeln!(f, "<!DOCTYPE {}>", name)?;
            depth + 1
        }
        NodeData::Comment(ref text) => {
            indent(f, depth)?;
            writeln!(f, "<!--{}-->", text)?;
            depth + 1
        }
        NodeData::Text(ref text) => {
            let text = text.trim();
            if !text.is_empty() {
                indent(f, depth)?;
                if is_raw_text_parent(soup, id) {
                    f.write_str(text)?;
                } else {
                    write_escaped(f, text, false)?;
                }
                f.write_char('\n')?;
            }
            depth + 1
        }
        NodeData::Element(ref tag) => {
            indent(f, depth)?;
            writeln!(f, "{}", tag)?;
            depth + 1
        }
    };

    for &child in soup.get(id).children() {
        write_pretty(f, soup, child, child_depth)?;
    }

    if let Some(tag) = soup.get(id).as_tag() {
        if has_end_tag(soup, id, &tag.name) {
            indent(f, depth)?;
            writeln!(f, "</{}>", tag.name)?;
        }
    }

    Ok(())
}

impl Display for Pretty<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_pretty(f, self.0, self.0.root(), 0)
    }
}

impl Soup {
    /// Render the document with one tag or text node per line, indented by one space per level.
    ///
    /// Whitespace-only text is dropped and all other text is trimmed, so this is meant for
    /// reading, not for round-tripping.
    ///
    /// ```
    /// use soupswap::Soup;
    ///
    /// let soup = Soup::parse("<div><p>Hello</p><br></div>").unwrap();
    /// assert_eq!(soup.prettify(), "<div>\n <p>\n  Hello\n </p>\n <br>\n</div>\n");
    /// ```
    pub fn prettify(&self) -> String {
        self.pretty().to_string()
    }

    /// Like [`Soup::prettify`], but returns a value implementing [`Display`] so the output can be
    /// written without building a string first.
    pub fn pretty(&self) -> Pretty<'_> {
        Pretty(self)
    }
}

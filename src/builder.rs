//! A tag soup tree builder on top of the html5gum tokenizer.
//!
//! This is not the WHATWG tree construction algorithm. There are no implied tags, no adoption
//! agency and no foster parenting: elements nest exactly the way the markup says, and end tags
//! without a matching open element are dropped.
use html5gum::{DefaultEmitter, Readable, Reader, Token, Tokenizer};

use crate::soup::{NodeData, NodeId};
use crate::utils::{is_raw_text_element, is_void_element, trace_log};
use crate::{CallbackError, Error, Soup, Tag, TagObserver};

#[derive(Debug)]
struct OpenElement {
    id: NodeId,
    /// The tag name as it appeared in the markup, before any observer renamed it. End tags are
    /// matched against this.
    source_name: String,
}

/// Builds a [`Soup`] from tokens, giving an optional [`TagObserver`] the chance to rewrite each
/// start tag before it is inserted.
///
/// [`Soup::parse`] and [`Soup::parse_with`] are shortcuts for this.
///
/// ```
/// use soupswap::{FnObserver, Tag, TreeBuilder};
///
/// let mut seen = Vec::new();
/// let mut log = FnObserver::new(|tag: &mut Tag| -> Result<(), soupswap::CallbackError> {
///     seen.push(tag.name.clone());
///     Ok(())
/// });
///
/// TreeBuilder::with_observer(&mut log).build("<h1>Title</h1>").unwrap();
/// assert_eq!(seen, vec!["h1"]);
/// ```
pub struct TreeBuilder<'o> {
    soup: Soup,
    open_elements: Vec<OpenElement>,
    observer: Option<&'o mut dyn TagObserver>,
}

impl Default for TreeBuilder<'_> {
    fn default() -> Self {
        TreeBuilder::new()
    }
}

impl<'o> TreeBuilder<'o> {
    /// A tree builder that leaves tags as they are.
    #[must_use]
    pub fn new() -> Self {
        TreeBuilder {
            soup: Soup::default(),
            open_elements: Vec::new(),
            observer: None,
        }
    }

    /// A tree builder that calls `observer` for every start tag.
    #[must_use]
    pub fn with_observer(observer: &'o mut dyn TagObserver) -> Self {
        TreeBuilder {
            observer: Some(observer),
            ..TreeBuilder::new()
        }
    }

    /// Tokenize `input` and build the tree.
    ///
    /// Fails if the reader fails, or if the observer returns an error. In both cases the partial
    /// tree is discarded.
    pub fn build<'a, R: Readable<'a>>(
        mut self,
        input: R,
    ) -> Result<Soup, Error<<R::Reader as Reader>::Error>> {
        let mut emitter: DefaultEmitter = DefaultEmitter::default();
        // switch to RCDATA/RAWTEXT after <title>, <script> etc. so their content is text
        emitter.naively_switch_states(true);

        for token in Tokenizer::new_with_emitter(input, emitter) {
            self.process_token(token.map_err(Error::Read)?)?;
        }

        trace_log!(
            "build: done, {} elements left open",
            self.open_elements.len()
        );
        Ok(self.soup)
    }

    fn current_node(&self) -> NodeId {
        self.open_elements
            .last()
            .map_or_else(|| self.soup.root(), |open| open.id)
    }

    fn process_token(&mut self, token: Token) -> Result<(), CallbackError> {
        match token {
            Token::StartTag(tag) => {
                let source_name = String::from_utf8_lossy(&tag.name).into_owned();
                let attributes = tag
                    .attributes
                    .into_iter()
                    .map(|(name, value)| {
                        (
                            String::from_utf8_lossy(&name).into_owned(),
                            String::from_utf8_lossy(&value).into_owned(),
                        )
                    })
                    .collect();
                let new_tag = Tag {
                    name: source_name.clone(),
                    attributes,
                };
                self.open_tag(new_tag, source_name, tag.self_closing)?;
            }
            Token::EndTag(tag) => {
                self.close_tag(&String::from_utf8_lossy(&tag.name));
            }
            Token::String(text) => {
                let parent = self.current_node();
                self.soup
                    .append_text(parent, &String::from_utf8_lossy(&text));
            }
            Token::Comment(comment) => {
                let parent = self.current_node();
                self.soup.append(
                    parent,
                    NodeData::Comment(String::from_utf8_lossy(&comment).into_owned()),
                );
            }
            Token::Doctype(doctype) => {
                let parent = self.current_node();
                self.soup.append(
                    parent,
                    NodeData::Doctype(String::from_utf8_lossy(&doctype.name).into_owned()),
                );
            }
            _error => {
                // the tokenizer already recovered, the tree does not care about syntax errors
                trace_log!("process_token: ignoring {:?}", _error);
            }
        }

        Ok(())
    }

    fn open_tag(
        &mut self,
        mut tag: Tag,
        source_name: String,
        self_closing: bool,
    ) -> Result<(), CallbackError> {
        if let Some(ref mut observer) = self.observer {
            observer.on_tag_open(&mut tag)?;
        }

        trace_log!("open_tag: {} as {}", source_name, tag);
        let parent = self.current_node();
        let raw_text = is_raw_text_element(&source_name);
        let id = self.soup.append_element(parent, tag, raw_text);

        if !self_closing && !is_void_element(&source_name) {
            self.open_elements.push(OpenElement { id, source_name });
        }

        Ok(())
    }

    fn close_tag(&mut self, source_name: &str) {
        match self
            .open_elements
            .iter()
            .rposition(|open| open.source_name == source_name)
        {
            Some(index) => {
                trace_log!(
                    "close_tag: {}, closing {} elements",
                    source_name,
                    self.open_elements.len() - index
                );
                self.open_elements.truncate(index);
            }
            None => {
                trace_log!("close_tag: no open element for </{}>", source_name);
            }
        }
    }
}

#![deny(missing_docs)]
// This parses HTML, which can be untrusted input from the internet.
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod builder;
mod error;
mod replacer;
mod serialize;
mod soup;
mod tag;
mod utils;

#[doc(hidden)]
pub mod testutils;

pub use builder::TreeBuilder;
pub use error::Error;
pub use replacer::{CallbackError, FnObserver, SoupReplacer, TagObserver};
pub use serialize::Pretty;
pub use soup::{Descendants, ElementRef, Node, NodeData, NodeId, Soup};
pub use tag::{Attributes, Tag};

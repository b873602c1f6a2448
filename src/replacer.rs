//! The tag transformer and the hook the tree builder calls it through.
//!
//! [`SoupReplacer`] bundles up to four optional transformation steps. The tree builder does not
//! know about it directly: it only depends on [`TagObserver`], which `SoupReplacer` implements.
use std::fmt;

use crate::utils::trace_log;
use crate::{Attributes, Tag};

/// The error type callbacks may fail with.
///
/// Anything that converts into a boxed error works, including `&str` and `String`.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

type NameTransform = Box<dyn FnMut(&Tag) -> Result<Option<String>, CallbackError>>;
type AttributesTransform = Box<dyn FnMut(&Tag) -> Result<Option<Attributes>, CallbackError>>;
type SideEffect = Box<dyn FnMut(&mut Tag) -> Result<(), CallbackError>>;

/// Gets to see every start tag right after the tokenizer produced it, and before it becomes part
/// of the document tree.
///
/// Whatever the observer does to the tag is what ends up in the tree. Returning an error aborts
/// the parse.
///
/// Observers can be passed by mutable reference or boxed. To use a plain function or closure,
/// wrap it in [`FnObserver`].
pub trait TagObserver {
    /// Inspect or mutate a newly opened tag.
    fn on_tag_open(&mut self, tag: &mut Tag) -> Result<(), CallbackError>;
}

impl<T: TagObserver + ?Sized> TagObserver for &mut T {
    fn on_tag_open(&mut self, tag: &mut Tag) -> Result<(), CallbackError> {
        (**self).on_tag_open(tag)
    }
}

impl<T: TagObserver + ?Sized> TagObserver for Box<T> {
    fn on_tag_open(&mut self, tag: &mut Tag) -> Result<(), CallbackError> {
        (**self).on_tag_open(tag)
    }
}

/// A [`TagObserver`] that calls a function with the same signature as
/// [`TagObserver::on_tag_open`].
///
/// ```
/// use soupswap::{CallbackError, FnObserver, Soup, Tag};
///
/// let mut observer = FnObserver::new(|tag: &mut Tag| {
///     tag.name.make_ascii_uppercase();
///     Ok::<_, CallbackError>(())
/// });
/// let soup = Soup::parse_with("<p>a</p>", &mut observer).unwrap();
/// assert_eq!(soup.to_string(), "<P>a</P>");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnObserver<F>(F);

impl<F> FnObserver<F>
where
    F: FnMut(&mut Tag) -> Result<(), CallbackError>,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        FnObserver(f)
    }
}

impl<F> TagObserver for FnObserver<F>
where
    F: FnMut(&mut Tag) -> Result<(), CallbackError>,
{
    fn on_tag_open(&mut self, tag: &mut Tag) -> Result<(), CallbackError> {
        (self.0)(tag)
    }
}

/// A tag transformation helper that runs during parsing, so the parse tree directly contains
/// transformed tags.
///
/// Two usage styles exist. A simple rename:
///
/// ```
/// use soupswap::{Soup, SoupReplacer};
///
/// let mut replacer = SoupReplacer::rename("b", "blockquote");
/// let soup = Soup::parse_with("<b>Hi</b><i>there</i>", &mut replacer).unwrap();
/// assert_eq!(soup.to_string(), "<blockquote>Hi</blockquote><i>there</i>");
/// ```
///
/// And the callback style, where every step is optional:
///
/// ```
/// use soupswap::{Soup, SoupReplacer};
///
/// let mut replacer = SoupReplacer::new()
///     .name_transform(|tag| if tag.name == "b" { Some("blockquote".into()) } else { None })
///     .side_effect(|tag| {
///         tag.attributes.remove("class");
///     });
///
/// let soup = Soup::parse_with(r#"<b class="x">Bold</b>"#, &mut replacer).unwrap();
/// assert_eq!(soup.to_string(), "<blockquote>Bold</blockquote>");
/// ```
///
/// The steps always run in the order documented on [`SoupReplacer::transform_tag`], no matter in
/// which order the builder methods were called.
#[derive(Default)]
pub struct SoupReplacer {
    legacy_name_pair: Option<(String, String)>,
    name_transform: Option<NameTransform>,
    attributes_transform: Option<AttributesTransform>,
    side_effect: Option<SideEffect>,
}

impl SoupReplacer {
    /// Create a transformer that does nothing. Use the builder methods to enable steps.
    #[must_use]
    pub fn new() -> Self {
        SoupReplacer::default()
    }

    /// Create a transformer that renames every tag called `original` to `replacement`.
    #[must_use]
    pub fn rename(original: impl Into<String>, replacement: impl Into<String>) -> Self {
        SoupReplacer::new().legacy_name_pair(original, replacement)
    }

    /// Rename every tag called `original` to `replacement`.
    ///
    /// The pair only takes effect if both names are non-empty.
    #[must_use]
    pub fn legacy_name_pair(
        mut self,
        original: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.legacy_name_pair = Some((original.into(), replacement.into()));
        self
    }

    /// Compute a new name for each tag. `None` or an empty string keep the current name.
    ///
    /// This step is skipped for tags that were already renamed by
    /// [`SoupReplacer::legacy_name_pair`].
    #[must_use]
    pub fn name_transform<F>(self, mut f: F) -> Self
    where
        F: FnMut(&Tag) -> Option<String> + 'static,
    {
        self.try_name_transform(move |tag| Ok::<_, CallbackError>(f(tag)))
    }

    /// Like [`SoupReplacer::name_transform`], but the callback may fail and abort the parse.
    #[must_use]
    pub fn try_name_transform<F, E>(mut self, mut f: F) -> Self
    where
        F: FnMut(&Tag) -> Result<Option<String>, E> + 'static,
        E: Into<CallbackError> + 'static,
    {
        self.name_transform = Some(Box::new(move |tag: &Tag| {
            f(tag).map_err(Into::<CallbackError>::into)
        }));
        self
    }

    /// Compute a new attribute map for each tag. `Some` replaces all attributes, `None` keeps
    /// them.
    ///
    /// The replacement is wholesale: a callback that wants to keep existing attributes has to
    /// copy them into the map it returns.
    #[must_use]
    pub fn attributes_transform<F>(self, mut f: F) -> Self
    where
        F: FnMut(&Tag) -> Option<Attributes> + 'static,
    {
        self.try_attributes_transform(move |tag| Ok::<_, CallbackError>(f(tag)))
    }

    /// Like [`SoupReplacer::attributes_transform`], but the callback may fail and abort the parse.
    #[must_use]
    pub fn try_attributes_transform<F, E>(mut self, mut f: F) -> Self
    where
        F: FnMut(&Tag) -> Result<Option<Attributes>, E> + 'static,
        E: Into<CallbackError> + 'static,
    {
        self.attributes_transform = Some(Box::new(move |tag: &Tag| {
            f(tag).map_err(Into::<CallbackError>::into)
        }));
        self
    }

    /// Run arbitrary code on each tag after the name and attribute steps.
    #[must_use]
    pub fn side_effect<F>(self, mut f: F) -> Self
    where
        F: FnMut(&mut Tag) + 'static,
    {
        self.try_side_effect(move |tag| {
            f(tag);
            Ok::<_, CallbackError>(())
        })
    }

    /// Like [`SoupReplacer::side_effect`], but the callback may fail and abort the parse.
    #[must_use]
    pub fn try_side_effect<F, E>(mut self, mut f: F) -> Self
    where
        F: FnMut(&mut Tag) -> Result<(), E> + 'static,
        E: Into<CallbackError> + 'static,
    {
        self.side_effect = Some(Box::new(move |tag: &mut Tag| {
            f(tag).map_err(Into::<CallbackError>::into)
        }));
        self
    }

    /// Apply all configured steps to `tag`, in place:
    ///
    /// 1. the legacy rename, if the tag's name matches the original name,
    /// 2. otherwise the name transform,
    /// 3. the attributes transform,
    /// 4. the side effect.
    ///
    /// If a callback fails, its error is returned and the remaining steps do not run. Steps that
    /// already ran stay applied.
    ///
    /// Running a transformer twice over the same tag only changes it once if all callbacks are
    /// pure functions of the tag and the first run renamed the tag away from the legacy name.
    /// That is a property of the callbacks, this method does not enforce it.
    pub fn transform_tag<'t>(&mut self, tag: &'t mut Tag) -> Result<&'t mut Tag, CallbackError> {
        trace_log!("transform_tag: {:?}", tag);

        match self.legacy_name_pair {
            Some((ref original, ref replacement))
                if !original.is_empty() && !replacement.is_empty() && tag.name == *original =>
            {
                tag.name.clone_from(replacement);
            }
            _ => {
                if let Some(ref mut name_transform) = self.name_transform {
                    if let Some(name) = name_transform(&*tag)?.filter(|name| !name.is_empty()) {
                        tag.name = name;
                    }
                }
            }
        }

        if let Some(ref mut attributes_transform) = self.attributes_transform {
            if let Some(attributes) = attributes_transform(&*tag)? {
                tag.attributes = attributes;
            }
        }

        if let Some(ref mut side_effect) = self.side_effect {
            side_effect(&mut *tag)?;
        }

        trace_log!("transform_tag: result {:?}", tag);
        Ok(tag)
    }
}

impl TagObserver for SoupReplacer {
    fn on_tag_open(&mut self, tag: &mut Tag) -> Result<(), CallbackError> {
        self.transform_tag(tag)?;
        Ok(())
    }
}

impl fmt::Debug for SoupReplacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoupReplacer")
            .field("legacy_name_pair", &self.legacy_name_pair)
            .field("name_transform", &self.name_transform.is_some())
            .field("attributes_transform", &self.attributes_transform.is_some())
            .field("side_effect", &self.side_effect.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::TreeBuilder;

    fn tag(name: &str) -> Tag {
        Tag::new(name).with_attribute("class", "y")
    }

    #[test]
    fn empty_replacer_is_noop() {
        let mut t = tag("b");
        SoupReplacer::new().transform_tag(&mut t).unwrap();
        assert_eq!(t, tag("b"));
    }

    #[test]
    fn legacy_rename_only_touches_matching_names() {
        let mut replacer = SoupReplacer::rename("b", "blockquote");

        let mut b = tag("b");
        replacer.transform_tag(&mut b).unwrap();
        assert_eq!(b.name, "blockquote");
        assert_eq!(b.get("class"), Some("y"));

        let mut i = tag("i");
        replacer.transform_tag(&mut i).unwrap();
        assert_eq!(i.name, "i");
    }

    #[test]
    fn legacy_pair_with_empty_component_is_ignored() {
        let mut t = Tag::new("");
        SoupReplacer::rename("", "x").transform_tag(&mut t).unwrap();
        assert_eq!(t.name, "");

        let mut t = tag("b");
        SoupReplacer::rename("b", "").transform_tag(&mut t).unwrap();
        assert_eq!(t.name, "b");
    }

    #[test]
    fn name_transform_skipped_when_legacy_rename_fires() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let calls2 = calls.clone();
        let mut replacer = SoupReplacer::rename("b", "blockquote").name_transform(move |tag| {
            calls2.borrow_mut().push(tag.name.clone());
            Some("strong".to_owned())
        });

        let mut b = tag("b");
        replacer.transform_tag(&mut b).unwrap();
        assert_eq!(b.name, "blockquote");

        let mut i = tag("i");
        replacer.transform_tag(&mut i).unwrap();
        assert_eq!(i.name, "strong");

        assert_eq!(*calls.borrow(), vec!["i".to_owned()]);
    }

    #[test]
    fn empty_or_missing_name_keeps_current_name() {
        let mut t = tag("b");
        SoupReplacer::new()
            .name_transform(|_| Some(String::new()))
            .transform_tag(&mut t)
            .unwrap();
        assert_eq!(t.name, "b");

        SoupReplacer::new()
            .name_transform(|_| None)
            .transform_tag(&mut t)
            .unwrap();
        assert_eq!(t.name, "b");
    }

    #[test]
    fn attributes_are_replaced_wholesale() {
        let mut t = tag("b");
        SoupReplacer::new()
            .attributes_transform(|_| {
                let mut attributes = Attributes::new();
                attributes.insert("data-new".into(), "ok".into());
                Some(attributes)
            })
            .transform_tag(&mut t)
            .unwrap();

        assert_eq!(t, Tag::new("b").with_attribute("data-new", "ok"));
    }

    #[test]
    fn attributes_transform_returning_none_keeps_attributes() {
        let mut t = tag("b");
        SoupReplacer::new()
            .attributes_transform(|_| None)
            .transform_tag(&mut t)
            .unwrap();
        assert_eq!(t, tag("b"));
    }

    #[test]
    fn steps_run_in_order_and_see_previous_results() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (log1, log2, log3) = (log.clone(), log.clone(), log.clone());

        // registered out of order on purpose
        let mut replacer = SoupReplacer::new()
            .side_effect(move |tag| log3.borrow_mut().push(format!("side_effect {}", tag)))
            .attributes_transform(move |tag| {
                log2.borrow_mut().push(format!("attributes {}", tag));
                Some(Attributes::new())
            })
            .name_transform(move |tag| {
                log1.borrow_mut().push(format!("name {}", tag));
                Some("strong".into())
            });

        let mut t = tag("b");
        replacer.transform_tag(&mut t).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "name <b class=\"y\">".to_owned(),
                "attributes <strong class=\"y\">".to_owned(),
                "side_effect <strong>".to_owned(),
            ]
        );
    }

    #[test]
    fn failing_callback_keeps_earlier_steps() {
        let side_effect_ran = Rc::new(RefCell::new(false));
        let side_effect_ran2 = side_effect_ran.clone();

        let mut replacer = SoupReplacer::rename("b", "blockquote")
            .try_attributes_transform(|_| Err("no attributes for you"))
            .side_effect(move |_| *side_effect_ran2.borrow_mut() = true);

        let mut t = tag("b");
        let err = replacer.transform_tag(&mut t).unwrap_err();

        assert_eq!(err.to_string(), "no attributes for you");
        assert_eq!(t.name, "blockquote");
        assert_eq!(t.get("class"), Some("y"));
        assert!(!*side_effect_ran.borrow());
    }

    #[test]
    fn pure_transformer_is_idempotent() {
        let mut replacer = SoupReplacer::rename("b", "blockquote")
            .name_transform(|tag| Some(tag.name.to_uppercase()))
            .attributes_transform(|tag| {
                let mut attributes = tag.attributes.clone();
                attributes.insert("data-seen".into(), "1".into());
                Some(attributes)
            });

        let mut t = tag("i");
        replacer.transform_tag(&mut t).unwrap();
        let once = t.clone();
        replacer.transform_tag(&mut t).unwrap();

        assert_eq!(t, once);
        assert_eq!(t.name, "I");
    }

    #[test]
    fn closures_are_observers() {
        let mut observer = FnObserver::new(|tag: &mut Tag| -> Result<(), CallbackError> {
            tag.name.push('2');
            Ok(())
        });
        let mut t = tag("h");
        observer.on_tag_open(&mut t).unwrap();
        assert_eq!(t.name, "h2");
    }

    #[test]
    fn observer_by_mutable_reference() {
        let mut replacer = SoupReplacer::rename("b", "strong");
        let mut by_ref: &mut SoupReplacer = &mut replacer;

        let soup = TreeBuilder::with_observer(&mut by_ref)
            .build("<b>x</b>")
            .unwrap();
        assert_eq!(soup.to_string(), "<strong>x</strong>");

        // still usable afterwards
        let mut t = tag("b");
        replacer.transform_tag(&mut t).unwrap();
        assert_eq!(t.name, "strong");
    }

    #[test]
    fn boxed_observer() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        let mut boxed: Box<dyn TagObserver> = Box::new(FnObserver::new(
            move |tag: &mut Tag| -> Result<(), CallbackError> {
                seen2.borrow_mut().push(tag.name.clone());
                Ok(())
            },
        ));

        let soup = TreeBuilder::with_observer(&mut boxed)
            .build("<p><i>a</i></p>")
            .unwrap();
        assert_eq!(soup.to_string(), "<p><i>a</i></p>");
        assert_eq!(*seen.borrow(), vec!["p".to_owned(), "i".to_owned()]);

        let mut boxed_replacer = Box::new(SoupReplacer::rename("p", "div"));
        let soup = TreeBuilder::with_observer(&mut boxed_replacer)
            .build("<p>a</p>")
            .unwrap();
        assert_eq!(soup.to_string(), "<div>a</div>");
    }
}

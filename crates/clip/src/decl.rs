//! Option and argument declarations.
//!
//! The registry stores type-erased descriptors ([`OptionDecl`], [`ArgumentDecl`]).
//! Callers build them through the typed handles [`Opt<T>`] and [`Arg<T>`], and
//! keep those handles around to read typed values back after a parse.

use std::borrow::Cow;
use std::marker::PhantomData;

use crate::value::{ArgValue, Scalar, TypeTag, Value};

/// Short key and long key of the built-in help switch.
pub const HELP_SHORT: char = 'h';
pub const HELP_LONG: &str = "help";
pub(crate) const HELP_DESCRIPTION: &str = "display usage and information.";

#[derive(Debug, Clone, PartialEq)]
pub struct OptionDecl {
    short: char,
    long: String,
    name: String,
    description: String,
    tag: TypeTag,
    default: Option<Value>,
}

impl OptionDecl {
    /// A required option of type `tag`. Switches (`bool`) are always optional
    /// and default to `false`.
    pub fn new(
        short: char,
        long: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        tag: TypeTag,
    ) -> Self {
        let default = tag.is_switch().then(|| Value::Single(Scalar::Bool(false)));
        Self {
            short,
            long: long.into(),
            name: name.into(),
            description: description.into(),
            tag,
            default,
        }
    }

    /// Attach a default, which also marks the option optional.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub(crate) fn help() -> Self {
        Self::new(HELP_SHORT, HELP_LONG, "", HELP_DESCRIPTION, bool::TAG)
    }

    pub fn short(&self) -> char {
        self.short
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    pub fn is_switch(&self) -> bool {
        self.tag.is_switch()
    }

    pub fn is_multi(&self) -> bool {
        self.tag.multi
    }

    /// `-k(long)`, the form used in parse error messages.
    pub fn display(&self) -> String {
        format!("-{}({})", self.short, self.long)
    }

    pub(crate) fn is_help(&self) -> bool {
        self.short == HELP_SHORT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDecl {
    name: String,
    description: String,
    tag: TypeTag,
    default: Option<Value>,
}

impl ArgumentDecl {
    pub fn new(name: impl Into<String>, description: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tag,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    /// A multi-valued positional argument swallows every remaining value.
    pub fn is_variadic(&self) -> bool {
        self.tag.multi
    }
}

/// Typed option handle.
///
/// ```
/// use clip::{Opt, Outcome, Parser};
///
/// let verbose = Opt::flag('v', "verbose", "print more");
/// let jobs = Opt::<u32>::new('j', "jobs", "N", "parallel jobs").with_default(1);
///
/// let mut parser = Parser::new();
/// parser.add(&verbose)?.add(&jobs)?;
/// assert_eq!(parser.parse(["prog", "-v"]), Outcome::Success);
/// assert!(parser.get(&verbose)?);
/// assert_eq!(parser.get(&jobs)?, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Opt<T> {
    decl: OptionDecl,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ArgValue> Opt<T> {
    /// A required option. `name` is the value placeholder shown in usage.
    pub fn new(
        short: char,
        long: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            decl: OptionDecl::new(short, long, name, description, T::TAG),
            _marker: PhantomData,
        }
    }

    pub fn with_default(mut self, default: T) -> Self {
        self.decl = self.decl.with_default(default.into_value());
        self
    }

    pub fn decl(&self) -> &OptionDecl {
        &self.decl
    }
}

impl Opt<bool> {
    /// A presence switch. Always optional; absent means `false`.
    pub fn flag(short: char, long: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(short, long, "", description)
    }
}

/// Typed positional argument handle.
#[derive(Debug, Clone)]
pub struct Arg<T> {
    decl: ArgumentDecl,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ArgValue> Arg<T> {
    /// A required positional argument. Use `Arg<Vec<T>>` for a variadic one.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            decl: ArgumentDecl::new(name, description, T::TAG),
            _marker: PhantomData,
        }
    }

    pub fn with_default(mut self, default: T) -> Self {
        self.decl = self.decl.with_default(default.into_value());
        self
    }

    pub fn decl(&self) -> &ArgumentDecl {
        &self.decl
    }
}

/// A declaration on its way into the registry.
///
/// Converting from a value (`Opt<T>`, `Arg<T>`) hands ownership to the
/// registry. Converting from a reference borrows it for the registry's
/// lifetime; the caller keeps ownership.
#[derive(Debug, Clone)]
pub enum Declaration<'d> {
    Opt(Cow<'d, OptionDecl>),
    Arg(Cow<'d, ArgumentDecl>),
}

impl Declaration<'_> {
    pub fn is_borrowed(&self) -> bool {
        matches!(
            self,
            Self::Opt(Cow::Borrowed(_)) | Self::Arg(Cow::Borrowed(_))
        )
    }
}

impl<T> From<Opt<T>> for Declaration<'_> {
    fn from(opt: Opt<T>) -> Self {
        Self::Opt(Cow::Owned(opt.decl))
    }
}

impl<'d, T> From<&'d Opt<T>> for Declaration<'d> {
    fn from(opt: &'d Opt<T>) -> Self {
        Self::Opt(Cow::Borrowed(&opt.decl))
    }
}

impl<T> From<Arg<T>> for Declaration<'_> {
    fn from(arg: Arg<T>) -> Self {
        Self::Arg(Cow::Owned(arg.decl))
    }
}

impl<'d, T> From<&'d Arg<T>> for Declaration<'d> {
    fn from(arg: &'d Arg<T>) -> Self {
        Self::Arg(Cow::Borrowed(&arg.decl))
    }
}

impl From<OptionDecl> for Declaration<'_> {
    fn from(decl: OptionDecl) -> Self {
        Self::Opt(Cow::Owned(decl))
    }
}

impl From<ArgumentDecl> for Declaration<'_> {
    fn from(decl: ArgumentDecl) -> Self {
        Self::Arg(Cow::Owned(decl))
    }
}

/// How a typed handle finds its declaration in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKey<'a> {
    Short(char),
    Name(&'a str),
}

/// Implemented by [`Opt<T>`] and [`Arg<T>`] so `Parser::get` can resolve them.
pub trait Handle {
    type Value: ArgValue;

    fn key(&self) -> DeclKey<'_>;
}

impl<T: ArgValue> Handle for Opt<T> {
    type Value = T;

    fn key(&self) -> DeclKey<'_> {
        DeclKey::Short(self.decl.short)
    }
}

impl<T: ArgValue> Handle for Arg<T> {
    type Value = T;

    fn key(&self) -> DeclKey<'_> {
        DeclKey::Name(&self.decl.name)
    }
}

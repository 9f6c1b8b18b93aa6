//! Ordered storage for declared options and positional arguments.

use std::borrow::Cow;

use crate::decl::{ArgumentDecl, DeclKey, Declaration, OptionDecl};
use crate::error::{DeclareError, DeclareResult};

/// Position of a declaration inside its registry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclId {
    Option(usize),
    Argument(usize),
}

/// Declared options and arguments, in declaration order.
///
/// Owned entries are dropped with the registry; borrowed entries stay with
/// the caller and must outlive it (enforced by `'d`).
#[derive(Debug, Clone)]
pub struct Registry<'d> {
    options: Vec<Cow<'d, OptionDecl>>,
    arguments: Vec<Cow<'d, ArgumentDecl>>,
    variadic_closed: bool,
}

impl Default for Registry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d> Registry<'d> {
    /// An empty registry holding only the built-in help switch.
    pub fn new() -> Self {
        Self {
            options: vec![Cow::Owned(OptionDecl::help())],
            arguments: Vec::new(),
            variadic_closed: false,
        }
    }

    pub fn add(&mut self, decl: Declaration<'d>) -> DeclareResult<DeclId> {
        let borrowed = decl.is_borrowed();
        let id = match decl {
            Declaration::Opt(opt) => self.add_option(opt)?,
            Declaration::Arg(arg) => self.add_argument(arg)?,
        };
        tracing::debug!(?id, borrowed, "declaration registered");
        Ok(id)
    }

    /// Append an option. Fails without side effects if either key is taken.
    pub fn add_option(&mut self, opt: Cow<'d, OptionDecl>) -> DeclareResult<DeclId> {
        if self.find_by_short_key(opt.short()).is_some()
            || self.find_by_long_key(opt.long()).is_some()
        {
            return Err(DeclareError::DuplicateKey {
                short: opt.short(),
                long: opt.long().to_string(),
            });
        }
        if let Some(default) = opt.default() {
            if !default.matches(opt.tag()) {
                return Err(DeclareError::DefaultTypeMismatch {
                    name: opt.display(),
                    tag: opt.tag(),
                });
            }
        }

        self.options.push(opt);
        Ok(DeclId::Option(self.options.len() - 1))
    }

    /// Append a positional argument. Nothing may follow a variadic argument.
    pub fn add_argument(&mut self, arg: Cow<'d, ArgumentDecl>) -> DeclareResult<DeclId> {
        if self.variadic_closed {
            return Err(DeclareError::VariadicAlreadyClosed(arg.name().to_string()));
        }
        if self.find_by_name(arg.name()).is_some() {
            return Err(DeclareError::DuplicateName(arg.name().to_string()));
        }
        if let Some(default) = arg.default() {
            if !default.matches(arg.tag()) {
                return Err(DeclareError::DefaultTypeMismatch {
                    name: arg.name().to_string(),
                    tag: arg.tag(),
                });
            }
        }

        if arg.is_variadic() {
            self.variadic_closed = true;
        }
        self.arguments.push(arg);
        Ok(DeclId::Argument(self.arguments.len() - 1))
    }

    pub fn find_by_short_key(&self, key: char) -> Option<(usize, &OptionDecl)> {
        self.options
            .iter()
            .enumerate()
            .find(|(_, o)| o.short() == key)
            .map(|(i, o)| (i, &**o))
    }

    pub fn find_by_long_key(&self, key: &str) -> Option<(usize, &OptionDecl)> {
        self.options
            .iter()
            .enumerate()
            .find(|(_, o)| o.long() == key)
            .map(|(i, o)| (i, &**o))
    }

    pub fn find_by_name(&self, name: &str) -> Option<(usize, &ArgumentDecl)> {
        self.arguments
            .iter()
            .enumerate()
            .find(|(_, a)| a.name() == name)
            .map(|(i, a)| (i, &**a))
    }

    pub(crate) fn resolve(&self, key: DeclKey<'_>) -> Option<DeclId> {
        match key {
            DeclKey::Short(c) => self.find_by_short_key(c).map(|(i, _)| DeclId::Option(i)),
            DeclKey::Name(name) => self.find_by_name(name).map(|(i, _)| DeclId::Argument(i)),
        }
    }

    pub fn option(&self, index: usize) -> Option<&OptionDecl> {
        self.options.get(index).map(|o| &**o)
    }

    pub fn argument(&self, index: usize) -> Option<&ArgumentDecl> {
        self.arguments.get(index).map(|a| &**a)
    }

    /// All options, the built-in help switch first.
    pub fn options(&self) -> impl ExactSizeIterator<Item = &OptionDecl> {
        self.options.iter().map(|o| &**o)
    }

    pub fn arguments(&self) -> impl ExactSizeIterator<Item = &ArgumentDecl> {
        self.arguments.iter().map(|a| &**a)
    }

    pub fn is_variadic_closed(&self) -> bool {
        self.variadic_closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Arg, Opt};
    use crate::value::{ArgValue, Scalar, Value};

    #[test]
    fn help_is_always_registered() {
        let reg = Registry::new();
        let (idx, help) = reg.find_by_short_key('h').unwrap();
        assert_eq!(idx, 0);
        assert_eq!(help.long(), "help");
        assert!(help.is_optional());
        assert!(reg.find_by_long_key("help").is_some());
    }

    #[test]
    fn duplicate_keys_are_rejected_atomically() {
        let mut reg = Registry::new();
        reg.add(Opt::flag('a', "all", "everything").into()).unwrap();

        let err = reg.add(Opt::flag('a', "other", "x").into()).unwrap_err();
        assert!(matches!(err, DeclareError::DuplicateKey { short: 'a', .. }));
        let err = reg.add(Opt::flag('b', "all", "x").into()).unwrap_err();
        assert!(matches!(err, DeclareError::DuplicateKey { short: 'b', .. }));
        let err = reg.add(Opt::flag('h', "halt", "x").into()).unwrap_err();
        assert!(matches!(err, DeclareError::DuplicateKey { short: 'h', .. }));

        assert_eq!(reg.options().len(), 2);
        assert!(reg.find_by_long_key("other").is_none());
    }

    #[test]
    fn duplicate_argument_names_are_rejected() {
        let mut reg = Registry::new();
        reg.add(Arg::<String>::new("name", "who").into()).unwrap();
        let err = reg.add(Arg::<i32>::new("name", "again").into()).unwrap_err();
        assert_eq!(err, DeclareError::DuplicateName("name".to_string()));
        assert_eq!(reg.arguments().len(), 1);
    }

    #[test]
    fn variadic_closes_the_argument_list() {
        let mut reg = Registry::new();
        reg.add(Arg::<String>::new("cmd", "command").into()).unwrap();
        reg.add(Arg::<Vec<i32>>::new("numbers", "numbers").into()).unwrap();
        assert!(reg.is_variadic_closed());

        let err = reg.add(Arg::<String>::new("tail", "x").into()).unwrap_err();
        assert_eq!(err, DeclareError::VariadicAlreadyClosed("tail".to_string()));
        let err = reg.add(Arg::<Vec<i32>>::new("more", "x").into()).unwrap_err();
        assert_eq!(err, DeclareError::VariadicAlreadyClosed("more".to_string()));

        // options are unaffected
        reg.add(Opt::flag('v', "verbose", "x").into()).unwrap();
    }

    #[test]
    fn mismatched_erased_default_is_rejected() {
        let mut reg = Registry::new();
        let decl = OptionDecl::new('n', "count", "N", "how many", i32::TAG)
            .with_default(Value::Single(Scalar::String("three".to_string())));
        let err = reg.add(decl.into()).unwrap_err();
        assert!(matches!(err, DeclareError::DefaultTypeMismatch { .. }));
    }

    #[test]
    fn lookups_return_declaration_positions() {
        let mut reg = Registry::new();
        let id = reg
            .add(Opt::<String>::new('o', "output", "FILE", "output").into())
            .unwrap();
        assert_eq!(id, DeclId::Option(1));
        assert_eq!(reg.resolve(DeclKey::Short('o')), Some(DeclId::Option(1)));
        assert_eq!(reg.resolve(DeclKey::Name("missing")), None);
    }
}

//! The parser: registration, token dispatch, validation and typed access.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use crate::decl::{ArgumentDecl, Declaration, Handle, OptionDecl};
use crate::error::{AccessError, AccessResult, ConvertError, DeclareResult, ParseError};
use crate::registry::{DeclId, Registry};
use crate::token::Token;
use crate::usage;
use crate::value::{ArgValue, Scalar, TypeTag, Value};

/// Parser-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// Trailing paragraph of the usage text.
    pub description: String,
    /// Write the error message to the error surface when a parse fails.
    pub show_errors: bool,
}

/// Terminal state of a parse. Help takes priority over failure.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    HelpShown,
}

/// Ways to address an option in [`Parser::option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey<'a> {
    Short(char),
    Long(&'a str),
    /// Position among user declared options (the help switch is not counted).
    Index(usize),
}

impl From<char> for OptionKey<'_> {
    fn from(c: char) -> Self {
        Self::Short(c)
    }
}

impl<'a> From<&'a str> for OptionKey<'a> {
    fn from(s: &'a str) -> Self {
        Self::Long(s)
    }
}

impl From<usize> for OptionKey<'_> {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl fmt::Display for OptionKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short(c) => write!(f, "-{c}"),
            Self::Long(s) => write!(f, "--{s}"),
            Self::Index(i) => write!(f, "option #{i}"),
        }
    }
}

/// Ways to address a positional argument in [`Parser::argument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for ArgumentKey<'a> {
    fn from(s: &'a str) -> Self {
        Self::Name(s)
    }
}

impl From<usize> for ArgumentKey<'_> {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl fmt::Display for ArgumentKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(s) => f.write_str(s),
            Self::Index(i) => write!(f, "argument #{i}"),
        }
    }
}

/// Values bound during one parse, keyed by declaration.
#[derive(Debug, Clone, Default)]
struct Bindings {
    values: HashMap<DeclId, Value>,
}

impl Bindings {
    fn is_set(&self, id: DeclId) -> bool {
        self.values.contains_key(&id)
    }

    fn get(&self, id: DeclId) -> Option<&Value> {
        self.values.get(&id)
    }

    fn set(&mut self, id: DeclId, value: Value) {
        self.values.insert(id, value);
    }

    /// Append to a multi-valued binding, starting it on first use.
    fn push(&mut self, id: DeclId, scalar: Scalar) {
        let value = self
            .values
            .entry(id)
            .or_insert_with(|| Value::Multi(Vec::new()));
        if let Value::Multi(items) = value {
            items.push(scalar);
        }
    }
}

fn invalid_type(display: String, source: ConvertError) -> ParseError {
    ParseError::InvalidType {
        display,
        source: Some(source),
    }
}

/// One pass over the token stream.
struct Scanner<'r, 'd> {
    registry: &'r Registry<'d>,
    bindings: Bindings,
    next_argument: usize,
}

impl<'r, 'd> Scanner<'r, 'd> {
    fn new(registry: &'r Registry<'d>) -> Self {
        Self {
            registry,
            bindings: Bindings::default(),
            next_argument: 0,
        }
    }

    /// Stops at the first error; bindings made before it are kept.
    fn run(&mut self, tokens: &[&str]) -> Result<(), ParseError> {
        let registry = self.registry;
        let mut i = 0usize;
        while i < tokens.len() {
            let raw = tokens[i];
            let token = Token::classify(raw);
            tracing::trace!(index = i, raw, ?token, "token");
            match token {
                Token::Value(value) => self.bind_positional(value)?,
                Token::Short(key) => {
                    let Some((idx, opt)) = registry.find_by_short_key(key) else {
                        return Err(ParseError::UnknownOption(format!("-{key}")));
                    };
                    i = self.consume_option(idx, opt, tokens, i)?;
                }
                Token::Long(key) => {
                    let Some((idx, opt)) = registry.find_by_long_key(key) else {
                        return Err(ParseError::UnknownOption(raw.to_string()));
                    };
                    i = self.consume_option(idx, opt, tokens, i)?;
                }
                Token::Bundle(keys) => self.bind_bundle(keys)?,
            }
            i += 1;
        }
        Ok(())
    }

    /// Bind the option at `tokens[at]`. Returns the index of the last token
    /// consumed, so the caller resumes right after it.
    fn consume_option(
        &mut self,
        idx: usize,
        opt: &OptionDecl,
        tokens: &[&str],
        at: usize,
    ) -> Result<usize, ParseError> {
        let id = DeclId::Option(idx);

        if opt.is_switch() {
            self.bindings.set(id, Value::Single(Scalar::Bool(true)));
            return Ok(at);
        }

        if opt.is_multi() {
            let mut next = at + 1;
            while let Some(raw) = tokens.get(next) {
                if Token::classify(raw).is_key() {
                    break;
                }
                let scalar = opt
                    .tag()
                    .scalar
                    .convert(raw)
                    .map_err(|e| invalid_type(opt.display(), e))?;
                self.bindings.push(id, scalar);
                next += 1;
            }
            // the key token that stopped us is handled by the outer loop
            return Ok(next - 1);
        }

        let value = tokens
            .get(at + 1)
            .filter(|raw| !Token::classify(raw).is_key());
        let Some(raw) = value else {
            return Err(ParseError::TooFewArguments(opt.display()));
        };
        if self.bindings.is_set(id) {
            return Err(ParseError::TooFewArguments(opt.display()));
        }
        let scalar = opt
            .tag()
            .scalar
            .convert(raw)
            .map_err(|e| invalid_type(opt.display(), e))?;
        self.bindings.set(id, Value::Single(scalar));
        Ok(at + 1)
    }

    /// `-abc`: every character must be a switch.
    fn bind_bundle(&mut self, keys: &str) -> Result<(), ParseError> {
        let registry = self.registry;
        for key in keys.chars() {
            let Some((idx, opt)) = registry.find_by_short_key(key) else {
                return Err(ParseError::UnknownOption(format!("-{key}")));
            };
            if !opt.is_switch() {
                return Err(ParseError::InvalidType {
                    display: opt.display(),
                    source: None,
                });
            }
            self.bindings
                .set(DeclId::Option(idx), Value::Single(Scalar::Bool(true)));
        }
        Ok(())
    }

    /// Fill positional arguments in order; overflow goes to a trailing
    /// variadic argument, or is dropped when there is none.
    fn bind_positional(&mut self, raw: &str) -> Result<(), ParseError> {
        let registry = self.registry;
        let count = registry.arguments().len();
        let idx = if self.next_argument < count {
            self.next_argument += 1;
            self.next_argument - 1
        } else if count > 0
            && registry
                .argument(count - 1)
                .is_some_and(ArgumentDecl::is_variadic)
        {
            count - 1
        } else {
            tracing::debug!(raw, "no positional argument left; value discarded");
            return Ok(());
        };

        let Some(arg) = registry.argument(idx) else {
            return Ok(());
        };
        let id = DeclId::Argument(idx);
        let scalar = arg
            .tag()
            .scalar
            .convert(raw)
            .map_err(|e| invalid_type(arg.name().to_string(), e))?;
        if arg.is_variadic() {
            self.bindings.push(id, scalar);
        } else {
            self.bindings.set(id, Value::Single(scalar));
        }
        Ok(())
    }

    /// Report the first required declaration left unset, options first.
    fn validate(&self) -> Result<(), ParseError> {
        for (idx, opt) in self.registry.options().enumerate() {
            if !opt.is_optional() && !self.bindings.is_set(DeclId::Option(idx)) {
                return Err(ParseError::MissingRequired(opt.display()));
            }
        }
        for (idx, arg) in self.registry.arguments().enumerate() {
            if !arg.is_optional() && !self.bindings.is_set(DeclId::Argument(idx)) {
                return Err(ParseError::MissingRequired(arg.name().to_string()));
            }
        }
        Ok(())
    }
}

/// Declarative command line parser.
///
/// ```
/// use clip::{Arg, Opt, Outcome, Parser};
///
/// let mut parser = Parser::with_description("this is sample app.");
/// parser
///     .add(Opt::flag('a', "arg1", "flag argument 1"))?
///     .add(Opt::flag('b', "arg2", "flag argument 2"))?
///     .add(Arg::<Vec<i32>>::new("numbers", "a list of numbers"))?;
///
/// assert_eq!(parser.parse(["app", "-ab", "10", "20"]), Outcome::Success);
/// assert!(parser.option::<bool>('a')?);
/// assert_eq!(parser.argument::<Vec<i32>>("numbers")?, vec![10, 20]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser<'d> {
    config: ParserConfig,
    registry: Registry<'d>,
    app_name: String,
    usage: Option<String>,
    bindings: Bindings,
    error: Option<ParseError>,
}

impl<'d> Parser<'d> {
    /// A parser without description that keeps errors to itself.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// A parser with a description that reports errors on stderr.
    pub fn with_description(description: impl Into<String>) -> Self {
        Self::with_config(ParserConfig {
            description: description.into(),
            show_errors: true,
        })
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            app_name: String::new(),
            usage: None,
            bindings: Bindings::default(),
            error: None,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Register an option or argument.
    ///
    /// Pass a value to hand it over, or a reference to keep ownership:
    /// `parser.add(Opt::flag(..))` vs `parser.add(&flag)`.
    pub fn add(&mut self, decl: impl Into<Declaration<'d>>) -> DeclareResult<&mut Self> {
        self.registry.add(decl.into())?;
        self.usage = None;
        Ok(self)
    }

    /// Register several declarations in order, stopping at the first error.
    pub fn add_all<I>(&mut self, decls: I) -> DeclareResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Declaration<'d>>,
    {
        for decl in decls {
            self.add(decl)?;
        }
        Ok(self)
    }

    pub fn registry(&self) -> &Registry<'d> {
        &self.registry
    }

    /// Parse `argv` (program name first), writing help to stdout and, when
    /// configured, errors to stderr.
    pub fn parse<I, S>(&mut self, argv: I) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.parse_with(argv, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Parse `argv` (program name first), writing help to `out` and errors to
    /// `err`.
    pub fn parse_with<I, S>(&mut self, argv: I, out: &mut dyn Write, err: &mut dyn Write) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let argv: Vec<S> = argv.into_iter().collect();
        let argv: Vec<&str> = argv.iter().map(|s| s.as_ref()).collect();

        self.bindings = Bindings::default();
        self.error = None;
        if let Some(program) = argv.first() {
            self.set_app_name(program);
        }
        let tokens = argv.get(1..).unwrap_or_default();
        tracing::debug!(app = %self.app_name, tokens = tokens.len(), "parse started");

        let mut scanner = Scanner::new(&self.registry);
        let result = scanner.run(tokens).and_then(|()| scanner.validate());
        self.bindings = scanner.bindings;

        let help = tokens.iter().any(|raw| Token::classify(raw).requests_help());
        if help {
            self.bindings
                .set(DeclId::Option(0), Value::Single(Scalar::Bool(true)));
        }
        self.error = result.err();

        let outcome = match (&self.error, help) {
            (_, true) => Outcome::HelpShown,
            (Some(_), false) => Outcome::Failure,
            (None, false) => Outcome::Success,
        };
        tracing::debug!(?outcome, error = ?self.error, "parse finished");

        match outcome {
            Outcome::HelpShown => {
                if let Err(e) = self.show_usage_to(out) {
                    tracing::warn!(error = %e, "failed to write usage");
                }
            }
            Outcome::Failure if self.config.show_errors => {
                let message = self.error_message();
                if let Err(e) = writeln!(err, "{message}") {
                    tracing::warn!(error = %e, "failed to write parse error");
                }
            }
            _ => {}
        }
        outcome
    }

    /// Name shown on the usage line. Any directory prefix is stripped; the
    /// next parse replaces it with its own first argument.
    pub fn set_app_name(&mut self, program: &str) {
        let name = program
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(program);
        if name != self.app_name {
            self.app_name = name.to_string();
            self.usage = None;
        }
    }

    /// Program name from the last parse, without its directory.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Error of the last parse, empty if there was none.
    pub fn error_message(&self) -> String {
        self.error.as_ref().map(ParseError::message).unwrap_or_default()
    }

    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Usage text, rebuilt only after declarations (or the app name) change.
    pub fn usage(&mut self) -> &str {
        if self.usage.is_none() {
            tracing::trace!("rendering usage");
        }
        let (app, description, registry) = (&self.app_name, &self.config.description, &self.registry);
        self.usage
            .get_or_insert_with(|| usage::render(app, description, registry))
    }

    /// Print the usage text to stdout.
    pub fn show_usage(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        self.show_usage_to(&mut stdout.lock())
    }

    pub fn show_usage_to(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", self.usage())
    }

    /// Typed value of an option, by short key, long key or index.
    pub fn option<'k, T: ArgValue>(&self, key: impl Into<OptionKey<'k>>) -> AccessResult<T> {
        let key = key.into();
        let found = match key {
            OptionKey::Short(c) => self.registry.find_by_short_key(c),
            OptionKey::Long(long) => self.registry.find_by_long_key(long),
            OptionKey::Index(i) => i
                .checked_add(1)
                .and_then(|j| self.registry.option(j).map(|o| (j, o))),
        };
        let (idx, _) = found.ok_or_else(|| AccessError::NotFound(key.to_string()))?;
        self.typed(DeclId::Option(idx))
    }

    /// Typed value of a positional argument, by name or index.
    pub fn argument<'k, T: ArgValue>(&self, key: impl Into<ArgumentKey<'k>>) -> AccessResult<T> {
        let key = key.into();
        let found = match key {
            ArgumentKey::Name(name) => self.registry.find_by_name(name).map(|(i, _)| i),
            ArgumentKey::Index(i) => self.registry.argument(i).map(|_| i),
        };
        let idx = found.ok_or_else(|| AccessError::NotFound(key.to_string()))?;
        self.typed(DeclId::Argument(idx))
    }

    /// Typed value for a declaration handle.
    pub fn get<H: Handle>(&self, handle: &H) -> AccessResult<H::Value> {
        let key = handle.key();
        let id = self
            .registry
            .resolve(key)
            .ok_or_else(|| AccessError::NotFound(format!("{key:?}")))?;
        self.typed(id)
    }

    /// Whether the last parse bound a value to `handle`.
    pub fn is_set<H: Handle>(&self, handle: &H) -> bool {
        self.registry
            .resolve(handle.key())
            .is_some_and(|id| self.bindings.is_set(id))
    }

    /// Bound value of the last parse, or the declared default.
    pub fn bound_value(&self, id: DeclId) -> Option<&Value> {
        self.bindings.get(id).or_else(|| self.describe(id)?.2)
    }

    fn describe(&self, id: DeclId) -> Option<(String, TypeTag, Option<&Value>)> {
        match id {
            DeclId::Option(i) => self
                .registry
                .option(i)
                .map(|o| (o.display(), o.tag(), o.default())),
            DeclId::Argument(i) => self
                .registry
                .argument(i)
                .map(|a| (a.name().to_string(), a.tag(), a.default())),
        }
    }

    fn typed<T: ArgValue>(&self, id: DeclId) -> AccessResult<T> {
        let (name, declared, default) = self
            .describe(id)
            .ok_or_else(|| AccessError::NotFound(format!("{id:?}")))?;
        let mismatch = |name: String| AccessError::TypeMismatch {
            name,
            declared,
            requested: T::TAG,
        };
        if declared != T::TAG {
            return Err(mismatch(name));
        }
        let Some(value) = self.bindings.get(id).or(default) else {
            return Err(AccessError::Unset(name));
        };
        T::from_value(value).ok_or_else(|| mismatch(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Arg, Opt};

    fn parse(parser: &mut Parser<'_>, argv: &[&str]) -> (Outcome, String, String) {
        let mut out = Vec::<u8>::new();
        let mut err = Vec::<u8>::new();
        let outcome = parser.parse_with(argv, &mut out, &mut err);
        (
            outcome,
            String::from_utf8_lossy(&out).into_owned(),
            String::from_utf8_lossy(&err).into_owned(),
        )
    }

    #[test]
    fn multi_option_stops_at_next_key() {
        let mut parser = Parser::new();
        parser
            .add(Opt::<Vec<i64>>::new('n', "nums", "n", "numbers"))
            .unwrap()
            .add(Opt::flag('v', "verbose", "verbose"))
            .unwrap();

        let (outcome, _, _) = parse(&mut parser, &["prog", "-n", "1", "2", "-v"]);
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(parser.option::<Vec<i64>>('n').unwrap(), vec![1, 2]);
        assert!(parser.option::<bool>("verbose").unwrap());
    }

    #[test]
    fn multi_option_accumulates_across_occurrences() {
        let mut parser = Parser::new();
        parser
            .add(Opt::<Vec<String>>::new('I', "include", "dir", "dirs"))
            .unwrap();
        let (outcome, _, _) = parse(&mut parser, &["prog", "-I", "a", "--include", "b", "c"]);
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(
            parser.option::<Vec<String>>("include").unwrap(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn multi_option_with_no_values_is_unset() {
        let mut parser = Parser::new();
        let nums = Opt::<Vec<i32>>::new('n', "nums", "n", "numbers");
        parser.add(&nums).unwrap();

        let (outcome, _, _) = parse(&mut parser, &["prog", "-n"]);
        assert_eq!(outcome, Outcome::Failure);
        assert!(!parser.is_set(&nums));
        assert_eq!(parser.error_message(), "-n(nums) should be specified.");
    }

    #[test]
    fn multi_option_conversion_failure_is_invalid_type() {
        let mut parser = Parser::new();
        parser
            .add(Opt::<Vec<i32>>::new('n', "nums", "n", "numbers"))
            .unwrap();
        let (outcome, _, _) = parse(&mut parser, &["prog", "-n", "1", "x", "3"]);
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(
            parser.error_message(),
            "invalid type was specified for -n(nums)"
        );
    }

    #[test]
    fn single_option_requires_a_value_token() {
        let mut parser = Parser::new();
        parser
            .add(Opt::<String>::new('o', "output", "file", "output"))
            .unwrap()
            .add(Opt::flag('v', "verbose", "verbose"))
            .unwrap();

        let (outcome, _, _) = parse(&mut parser, &["prog", "-o"]);
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(
            parser.error_message(),
            "argument should be specified for -o(output)"
        );

        let (outcome, _, _) = parse(&mut parser, &["prog", "-o", "-v"]);
        assert_eq!(outcome, Outcome::Failure);
        assert!(matches!(parser.error(), Some(ParseError::TooFewArguments(_))));
    }

    #[test]
    fn single_option_cannot_be_bound_twice() {
        let mut parser = Parser::new();
        parser
            .add(Opt::<String>::new('o', "output", "file", "output"))
            .unwrap();
        let (outcome, _, _) = parse(&mut parser, &["prog", "-o", "a", "--output", "b"]);
        assert_eq!(outcome, Outcome::Failure);
        assert!(matches!(parser.error(), Some(ParseError::TooFewArguments(_))));
        assert_eq!(parser.option::<String>('o').unwrap(), "a");
    }

    #[test]
    fn single_option_conversion_failure_is_invalid_type() {
        let mut parser = Parser::new();
        parser.add(Opt::<u32>::new('j', "jobs", "n", "jobs")).unwrap();
        let (outcome, _, _) = parse(&mut parser, &["prog", "--jobs", "many"]);
        assert_eq!(outcome, Outcome::Failure);
        let Some(ParseError::InvalidType { display, source }) = parser.error() else {
            panic!("expected InvalidType, got {:?}", parser.error());
        };
        assert_eq!(display, "-j(jobs)");
        assert_eq!(source.as_ref().map(|e| e.raw.as_str()), Some("many"));
    }

    #[test]
    fn bundle_rejects_value_options() {
        let mut parser = Parser::new();
        parser
            .add(Opt::flag('a', "all", "all"))
            .unwrap()
            .add(Opt::<i32>::new('n', "num", "n", "num").with_default(0))
            .unwrap();
        let (outcome, _, _) = parse(&mut parser, &["prog", "-an"]);
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(parser.error_message(), "invalid type was specified for -n(num)");

        let (outcome, _, _) = parse(&mut parser, &["prog", "-az"]);
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(parser.error_message(), "invalid argument name specified: -z");
    }

    #[test]
    fn unknown_long_key_names_raw_token() {
        let mut parser = Parser::new();
        let (outcome, _, _) = parse(&mut parser, &["prog", "--nope"]);
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(
            parser.error_message(),
            "invalid argument name specified: --nope"
        );
    }

    #[test]
    fn excess_positionals_are_dropped_without_variadic() {
        let mut parser = Parser::new();
        parser.add(Arg::<String>::new("first", "first")).unwrap();
        let (outcome, _, _) = parse(&mut parser, &["prog", "a", "b", "c"]);
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(parser.argument::<String>(0usize).unwrap(), "a");
    }

    #[test]
    fn positional_conversion_failure_names_argument() {
        let mut parser = Parser::new();
        parser.add(Arg::<f64>::new("ratio", "ratio")).unwrap();
        let (outcome, _, _) = parse(&mut parser, &["prog", "abc"]);
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(parser.error_message(), "invalid type was specified for ratio");
    }

    #[test]
    fn help_wins_and_is_written_to_out() {
        let mut parser = Parser::with_description("demo");
        parser.add(Opt::<i32>::new('n', "num", "n", "num")).unwrap();

        let (outcome, out, err) = parse(&mut parser, &["/usr/bin/demo", "--bogus", "-h"]);
        assert_eq!(outcome, Outcome::HelpShown);
        assert!(out.starts_with("Usage:\n    demo "));
        assert!(err.is_empty());
        assert!(parser.option::<bool>('h').unwrap());
    }

    #[test]
    fn failure_is_written_to_err_when_configured() {
        let mut parser = Parser::with_description("demo");
        parser.add(Arg::<String>::new("name", "name")).unwrap();
        let (outcome, out, err) = parse(&mut parser, &["demo"]);
        assert_eq!(outcome, Outcome::Failure);
        assert!(out.is_empty());
        assert_eq!(err, "name should be specified.\n");

        let mut quiet = Parser::new();
        quiet.add(Arg::<String>::new("name", "name")).unwrap();
        let (outcome, _, err) = parse(&mut quiet, &["demo"]);
        assert_eq!(outcome, Outcome::Failure);
        assert!(err.is_empty());
    }

    #[test]
    fn state_resets_between_parses() {
        let mut parser = Parser::new();
        let verbose = Opt::flag('v', "verbose", "verbose");
        parser.add(&verbose).unwrap();

        let (outcome, _, _) = parse(&mut parser, &["prog", "-v"]);
        assert_eq!(outcome, Outcome::Success);
        assert!(parser.get(&verbose).unwrap());

        let (outcome, _, _) = parse(&mut parser, &["prog", "--oops"]);
        assert_eq!(outcome, Outcome::Failure);
        let (outcome, _, _) = parse(&mut parser, &["prog"]);
        assert_eq!(outcome, Outcome::Success);
        assert!(!parser.get(&verbose).unwrap());
        assert!(parser.error_message().is_empty());
    }

    #[test]
    fn accessors_check_declared_type() {
        let mut parser = Parser::new();
        parser
            .add(Opt::<i32>::new('n', "num", "n", "num").with_default(7))
            .unwrap();
        let (outcome, _, _) = parse(&mut parser, &["prog"]);
        assert_eq!(outcome, Outcome::Success);

        assert_eq!(parser.option::<i32>(0usize).unwrap(), 7);
        let err = parser.option::<i64>('n').unwrap_err();
        assert!(matches!(err, AccessError::TypeMismatch { .. }));
        let err = parser.option::<Vec<i32>>("num").unwrap_err();
        assert!(matches!(err, AccessError::TypeMismatch { .. }));
        let err = parser.option::<i32>('z').unwrap_err();
        assert_eq!(err, AccessError::NotFound("-z".to_string()));
        let err = parser.argument::<i32>(0usize).unwrap_err();
        assert_eq!(err, AccessError::NotFound("argument #0".to_string()));
    }

    #[test]
    fn out_of_range_indices_are_not_found() {
        let mut parser = Parser::new();
        parser.add(Opt::flag('q', "quiet", "quiet")).unwrap();

        assert!(!parser.option::<bool>(0usize).unwrap());
        let err = parser.option::<bool>(1usize).unwrap_err();
        assert_eq!(err, AccessError::NotFound("option #1".to_string()));
        let err = parser.option::<bool>(usize::MAX).unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));
        let err = parser.argument::<String>(usize::MAX).unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));
    }

    #[test]
    fn required_value_is_unset_before_parse() {
        let mut parser = Parser::new();
        parser.add(Arg::<String>::new("name", "name")).unwrap();
        let err = parser.argument::<String>("name").unwrap_err();
        assert_eq!(err, AccessError::Unset("name".to_string()));
    }

    #[test]
    fn usage_cache_follows_declarations_and_app_name() {
        let mut parser = Parser::new();
        let first = parser.usage().to_string();
        assert_eq!(parser.usage(), first);

        parser.add(Opt::flag('q', "quiet", "quiet")).unwrap();
        assert!(parser.usage().contains("--quiet"));

        let (_, _, _) = parse(&mut parser, &["C:\\tools\\app.exe"]);
        assert_eq!(parser.app_name(), "app.exe");
        assert!(parser.usage().starts_with("Usage:\n    app.exe [-h] [-q]"));
    }

    #[test]
    fn add_all_registers_in_order() {
        let mut parser = Parser::new();
        parser
            .add_all([
                Declaration::from(Opt::flag('x', "ex", "x")),
                Declaration::from(Arg::<String>::new("a", "a")),
                Declaration::from(Arg::<Vec<String>>::new("rest", "rest")),
            ])
            .unwrap();
        assert_eq!(parser.registry().options().len(), 2);
        assert_eq!(parser.registry().arguments().len(), 2);
        assert!(parser.registry().is_variadic_closed());
    }
}

//! Tiny declarative command line argument parser.
//!
//! Declare typed options and positional arguments, hand the raw argument
//! vector to [`Parser::parse`], then read typed values back:
//! - options have a one character short key (`-v`) and a long key (`--verbose`)
//! - `bool` options are switches and can be bundled (`-abc`)
//! - `Vec<T>` options and arguments take every following value token
//! - declarations without a default are required
//! - `-h`/`--help` is always available and prints the usage text
//!
//! ```
//! use clip::{Arg, Opt, Outcome, Parser};
//!
//! let name = Arg::<String>::new("name", "who to greet");
//! let count = Arg::<i32>::new("count", "how many times").with_default(0);
//!
//! let mut parser = Parser::new();
//! parser.add(&name)?.add(&count)?;
//!
//! assert_eq!(parser.parse(["prog", "alice"]), Outcome::Success);
//! assert_eq!(parser.get(&name)?, "alice");
//! assert_eq!(parser.get(&count)?, 0);
//!
//! assert_eq!(parser.parse(["prog"]), Outcome::Failure);
//! assert_eq!(parser.error_message(), "name should be specified.");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decl;
mod error;
mod parser;
mod registry;
mod token;
mod usage;
mod value;

pub use decl::{
    Arg, ArgumentDecl, DeclKey, Declaration, HELP_LONG, HELP_SHORT, Handle, Opt, OptionDecl,
};
pub use error::{
    AccessError, AccessResult, ConvertError, DeclareError, DeclareResult, ParseError,
};
pub use parser::{ArgumentKey, OptionKey, Outcome, Parser, ParserConfig};
pub use registry::{DeclId, Registry};
pub use token::Token;
pub use value::{ArgValue, Scalar, ScalarType, TypeTag, Value};

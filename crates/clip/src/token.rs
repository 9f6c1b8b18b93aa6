//! Raw token classification.

use crate::decl::{HELP_LONG, HELP_SHORT};

/// What a raw argument looks like, judged only by its leading hyphens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Anything not starting with `-`, and the lone `-`.
    Value(&'a str),
    /// `-k`: exactly one character after the hyphen.
    Short(char),
    /// `-abc`: several switch characters after one hyphen.
    Bundle(&'a str),
    /// `--key`: the text after the two hyphens (possibly empty).
    Long(&'a str),
}

impl<'a> Token<'a> {
    pub fn classify(raw: &'a str) -> Self {
        if let Some(long) = raw.strip_prefix("--") {
            return Self::Long(long);
        }
        match raw.strip_prefix('-') {
            None | Some("") => Self::Value(raw),
            Some(keys) => {
                let mut chars = keys.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Short(c),
                    _ => Self::Bundle(keys),
                }
            }
        }
    }

    pub fn is_key(&self) -> bool {
        !matches!(self, Self::Value(_))
    }

    /// Whether this token sets the built-in help switch.
    pub fn requests_help(&self) -> bool {
        match *self {
            Self::Short(c) => c == HELP_SHORT,
            Self::Bundle(keys) => keys.contains(HELP_SHORT),
            Self::Long(key) => key == HELP_LONG,
            Self::Value(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Token;

    #[test]
    fn classify_by_leading_hyphens() {
        assert_eq!(Token::classify("file.txt"), Token::Value("file.txt"));
        assert_eq!(Token::classify("-"), Token::Value("-"));
        assert_eq!(Token::classify("-v"), Token::Short('v'));
        assert_eq!(Token::classify("-abc"), Token::Bundle("abc"));
        assert_eq!(Token::classify("--verbose"), Token::Long("verbose"));
        assert_eq!(Token::classify("--"), Token::Long(""));
        // negative numbers are key-shaped
        assert_eq!(Token::classify("-5"), Token::Short('5'));
        assert_eq!(Token::classify("-é"), Token::Short('é'));
    }

    #[test]
    fn help_is_recognised_in_every_key_form() {
        assert!(Token::classify("-h").requests_help());
        assert!(Token::classify("--help").requests_help());
        assert!(Token::classify("-vh").requests_help());
        assert!(!Token::classify("--helpful").requests_help());
        assert!(!Token::classify("h").requests_help());
        assert!(Token::classify("-v").is_key());
        assert!(!Token::classify("v").is_key());
    }
}

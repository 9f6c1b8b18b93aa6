//! Usage text rendering.

use crate::decl::{ArgumentDecl, OptionDecl};
use crate::registry::Registry;

const INDENT: &str = "    ";
const OPTIONAL_NOTE: &str = "(optional) ";

/// Placeholder for an option's value: its name, or the long key if unnamed.
fn value_name(opt: &OptionDecl) -> &str {
    if opt.name().is_empty() {
        opt.long()
    } else {
        opt.name()
    }
}

fn option_syntax(opt: &OptionDecl) -> String {
    let inner = if opt.is_switch() {
        format!("-{}", opt.short())
    } else if opt.is_multi() {
        format!("-{} <{}...>", opt.short(), value_name(opt))
    } else {
        format!("-{} <{}>", opt.short(), value_name(opt))
    };
    if opt.is_optional() {
        format!("[{inner}]")
    } else {
        inner
    }
}

fn argument_syntax(arg: &ArgumentDecl) -> String {
    let inner = if arg.is_variadic() {
        format!("{}...", arg.name())
    } else {
        arg.name().to_string()
    };
    if arg.is_optional() {
        format!("[{inner}]")
    } else {
        inner
    }
}

fn width_of(s: &str) -> usize {
    s.chars().count()
}

/// Render the full usage text.
///
/// Options are listed sorted by short key, arguments in declaration order.
/// Each block is aligned on its longest name plus two columns.
pub(crate) fn render(app: &str, description: &str, registry: &Registry<'_>) -> String {
    let mut options: Vec<&OptionDecl> = registry.options().collect();
    options.sort_by_key(|o| o.short());
    let arguments: Vec<&ArgumentDecl> = registry.arguments().collect();

    let mut line: Vec<String> = Vec::new();
    if !app.is_empty() {
        line.push(app.to_string());
    }
    line.extend(options.iter().map(|o| option_syntax(o)));
    line.extend(arguments.iter().map(|a| argument_syntax(a)));

    let mut out = String::new();
    out.push_str("Usage:\n");
    out.push_str(INDENT);
    out.push_str(&line.join(" "));
    out.push('\n');

    if !arguments.is_empty() {
        out.push_str("\nArguments:\n");
        let width = arguments.iter().map(|a| width_of(a.name())).max().unwrap_or(0) + 2;
        for arg in &arguments {
            let note = if arg.is_optional() { OPTIONAL_NOTE } else { "" };
            out.push_str(&format!(
                "{INDENT}{:width$}  {note}{}\n",
                arg.name(),
                arg.description(),
                width = width
            ));
        }
    }

    out.push_str("\nOptions:\n");
    let width = options.iter().map(|o| width_of(o.long())).max().unwrap_or(0) + 2;
    for opt in &options {
        let note = if opt.is_optional() && !opt.is_help() {
            OPTIONAL_NOTE
        } else {
            ""
        };
        let long = format!("--{}", opt.long());
        out.push_str(&format!(
            "{INDENT}-{}  {:width$}  {note}{}\n",
            opt.short(),
            long,
            opt.description(),
            width = width
        ));
    }

    if !description.is_empty() {
        out.push('\n');
        out.push_str(description);
        out.push('\n');
    }

    out
}

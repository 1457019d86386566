//! identifier styling
//!
//! casing rules for generated rust code: pascal case for type names, snake
//! case for fields and functions, raw identifiers on keyword collisions.

/// pascal-case a graphql name for use as a rust type identifier
pub fn to_rust_ident(name: &str) -> String {
    let mut out = String::new();
    let mut upper = true;
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            upper = true;
            continue;
        }
        if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    match out.as_str() {
        "Self" | "Type" | "Box" | "Option" | "Vec" | "Result" => format!("{}Type", out),
        _ => out,
    }
}

/// snake-case a graphql name for use as a rust field or function identifier
pub fn to_rust_field(name: &str) -> String {
    let mut out = String::new();
    for (idx, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if idx > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }

    if is_rust_keyword(&out) {
        format!("r#{}", out)
    } else {
        out
    }
}

/// uppercase the first character, leaving the rest untouched
///
/// used when deriving a nested wrapper name from a field or alias.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn is_rust_keyword(name: &str) -> bool {
    matches!(
        name,
        "as" | "break"
            | "const"
            | "continue"
            | "crate"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "Self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
    )
}

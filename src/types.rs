//! IR type names → Soroban Rust type names.
//!
//! The mapping is a closed table plus recursive rewriting of the two generic
//! containers. Names outside the table (user-defined types, already-Rust
//! `Result<..>` outputs) pass through unchanged; resolution of those happens
//! at instantiation time, not here.

/// Translate one IR type name into its Rust spelling.
pub fn translate_type(type_name: &str) -> String {
    let name = type_name.trim();

    if let Some(inner) = generic_inner(name, "List") {
        return format!("Vec<{}>", translate_type(inner));
    }
    if let Some(inner) = generic_inner(name, "Dictionary") {
        let (key, value) = split_pair(inner);
        return format!("Map<{}, {}>", translate_type(key), translate_type(value));
    }
    if let Some(inner) = generic_inner(name, "Option") {
        return format!("Option<{}>", translate_type(inner));
    }

    match name {
        "Address" => "Address".to_string(),
        "BigInteger" => "i128".to_string(),
        "Boolean" => "bool".to_string(),
        "Bytes" => "Bytes".to_string(),
        "ByteStringSmall" => "BytesN<32>".to_string(),
        "ByteStringLarge" => "BytesN<64>".to_string(),
        "Env" => "Env".to_string(),
        "Integer" => "i128".to_string(),
        "String" => "String".to_string(),
        "Symbol" => "Symbol".to_string(),
        other => other.to_string(),
    }
}

/// The `T` of `Outer<T>`, if `name` is that shape.
fn generic_inner<'a>(name: &'a str, outer: &str) -> Option<&'a str> {
    name.strip_prefix(outer)?
        .strip_prefix('<')?
        .strip_suffix('>')
}

/// Split `K, V` at the top-level comma (nested generics keep their commas).
fn split_pair(inner: &str) -> (&str, &str) {
    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return (&inner[..i], &inner[i + 1..]),
            _ => {}
        }
    }
    (inner, "")
}

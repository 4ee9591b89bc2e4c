//! Text conventions shared by the tables and signature resolution

/// Marker the function list uses to disambiguate overloads (`foo [overloaded_1]`)
pub const OVERLOAD_MARKER: &str = " [overloaded_";

/// Reference-table key for a unit name
///
/// Accepts internal (`a/b/C$D`) or dotted (`a.b.C$D`) names and writes nested
/// separators as `.$` so inner units get their own keys (`a.b.C.$D`).
#[must_use]
pub fn fqcn_key(unit_name: &str) -> String {
    unit_name.replace('/', ".").replace('$', ".$")
}

/// Declared type with generic arguments and whitespace removed
///
/// `Map<K, V>` → `Map`, `int []` → `int[]`, `List<String>[]` → `List[]`.
#[must_use]
pub fn raw_type(declared: &str) -> String {
    let compact: String = declared.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(start) = compact.find('<') {
        if let Some(end) = compact.rfind('>') {
            if end > start {
                return format!("{}{}", &compact[..start], &compact[end + 1..]);
            }
        }
    }
    compact
}

/// Prefix shared by all overload keys of `name`
#[must_use]
pub fn overload_prefix(name: &str) -> String {
    format!("{name}{OVERLOAD_MARKER}")
}

/// Check if `key` is an overload key of `name`
#[must_use]
pub fn is_overload_key(key: &str, name: &str) -> bool {
    key.len() > name.len() && key.starts_with(name) && key[name.len()..].starts_with(OVERLOAD_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fqcn_key_normalizes_separators() {
        assert_eq!(fqcn_key("example/Example"), "example.Example");
        assert_eq!(fqcn_key("example/Example$1"), "example.Example.$1");
        assert_eq!(fqcn_key("example.Generic$1Point"), "example.Generic.$1Point");
        assert_eq!(fqcn_key("a/B$C$D"), "a.B.$C.$D");
    }

    #[test]
    fn raw_type_strips_generics_and_whitespace() {
        assert_eq!(raw_type("Map<K,V>"), "Map");
        assert_eq!(raw_type("java.util.Map< K , V >"), "java.util.Map");
        assert_eq!(raw_type("int []"), "int[]");
        assert_eq!(raw_type("List<Map<K,V>>[]"), "List[]");
        assert_eq!(raw_type("String"), "String");
        assert_eq!(raw_type(""), "");
    }

    #[test]
    fn raw_type_ignores_unbalanced_brackets() {
        assert_eq!(raw_type("Weird>Type<"), "Weird>Type<");
    }

    #[test]
    fn overload_keys() {
        assert_eq!(overload_prefix("foo"), "foo [overloaded_");
        assert!(is_overload_key("foo [overloaded_1]", "foo"));
        assert!(!is_overload_key("foo", "foo"));
        assert!(!is_overload_key("foobar [overloaded_1]", "foo"));
        assert!(!is_overload_key("fo [overloaded_1]", "foo"));
    }
}

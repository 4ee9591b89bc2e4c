use proptest::prelude::*;
use tia_symbol::{fqcn_key, is_overload_key, overload_prefix, raw_type, ReferenceTable, SymbolEntry, SymbolTable, TableSet};

fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,8}"
}

proptest! {
    #[test]
    fn prop_raw_type_drops_generic_arguments(base in identifier(), args in prop::collection::vec(identifier(), 1..4)) {
        let declared = format!("{base}< {} >", args.join(" , "));
        prop_assert_eq!(raw_type(&declared), base);
    }

    #[test]
    fn prop_raw_type_is_idempotent(declared in "[A-Za-z<>, \\[\\]]{0,24}") {
        let once = raw_type(&declared);
        prop_assert_eq!(raw_type(&once), once.clone());
        prop_assert!(!once.contains(' '));
    }

    #[test]
    fn prop_fqcn_key_is_separator_agnostic(segments in prop::collection::vec(identifier(), 1..5), nested in prop::collection::vec(identifier(), 0..3)) {
        let mut dotted = segments.join(".");
        let mut internal = segments.join("/");
        for name in &nested {
            dotted.push('$');
            dotted.push_str(name);
            internal.push('$');
            internal.push_str(name);
        }
        let key = fqcn_key(&internal);
        prop_assert_eq!(&key, &fqcn_key(&dotted));
        prop_assert!(!key.contains('/'));
        prop_assert_eq!(key.matches(".$").count(), nested.len());
    }

    #[test]
    fn prop_overload_keys_belong_to_their_name(name in identifier(), other in identifier(), n in 0u32..100) {
        let key = format!("{}{n}]", overload_prefix(&name));
        prop_assert!(is_overload_key(&key, &name));
        prop_assert!(!is_overload_key(&name, &name));
        if !name.starts_with(&other) {
            prop_assert!(!is_overload_key(&key, &other));
        }
    }
}

#[test]
fn test_first_candidate_is_stable_across_loads() {
    let dir = tempfile::tempdir().unwrap();
    let mut symbols = SymbolTable::new();
    symbols.insert("A.java#A", SymbolEntry::default());
    symbols.insert("B.java#A", SymbolEntry::default());
    let references = ReferenceTable::new().with_class("a.A", ["A.java#A", "B.java#A"]);
    std::fs::write(dir.path().join("symTable.json"), serde_json::to_vec(&symbols).unwrap()).unwrap();
    std::fs::write(dir.path().join("refTable.json"), serde_json::to_vec(&references).unwrap()).unwrap();

    for _ in 0..3 {
        let tables = TableSet::load(dir.path()).unwrap();
        assert_eq!(tables.first_candidate("a.A").map(|(key, _)| key), Some("A.java#A"));
    }
}

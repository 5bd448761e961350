use std::collections::HashMap;

/// Variables declared with `let`, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    bindings: HashMap<String, f64>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<f64> {
        self.bindings.get(name).copied()
    }

    /// Binds `name` to `value`, replacing any earlier binding.
    pub fn define(&mut self, name: &str, value: f64) {
        self.bindings.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let table = SymbolTable::new();
        assert_eq!(table, SymbolTable::default());
        assert_eq!(table.lookup("x"), None);
    }

    #[test]
    fn test_define_and_lookup() {
        let mut table = SymbolTable::new();
        table.define("x", 5.0);
        table.define("y", -0.25);

        assert_eq!(table.lookup("x"), Some(5.0));
        assert_eq!(table.lookup("y"), Some(-0.25));
    }

    #[test]
    fn test_redefine_overwrites() {
        let mut table = SymbolTable::new();
        table.define("x", 1.0);
        table.define("x", 2.0);

        assert_eq!(table.lookup("x"), Some(2.0));

        let mut expected = SymbolTable::new();
        expected.define("x", 2.0);
        assert_eq!(table, expected);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut table = SymbolTable::new();
        table.define("x", 1.0);
        assert_eq!(table.lookup("X"), None);
    }
}

use crate::Value;

/// Integral numbers print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// Text written by `print` and `mirror`: top-level strings appear bare.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        other => repr(other),
    }
}

/// Source-like rendering, used for nested values and the REPL echo.
pub fn repr(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => format!("\"{}\"", s),
        Value::List(list) => {
            let items: Vec<String> = list.borrow().iter().map(repr).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(mapping) => {
            let fields: Vec<String> = mapping
                .borrow()
                .iter()
                .map(|(key, value)| format!("\"{}\": {}", key, repr(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::Function(function) => format!("<fn {}>", function.name),
        Value::Builtin(builtin) => format!("<builtin {}>", builtin.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_numbers() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_strings_quoted_only_when_nested() {
        let list = Value::list(vec![Value::Number(1.0), Value::string("a"), Value::Null]);
        assert_eq!(display(&Value::string("hi")), "hi");
        assert_eq!(display(&list), "[1, \"a\", null]");
        assert_eq!(repr(&Value::string("hi")), "\"hi\"");
    }

    #[test]
    fn test_mapping_keeps_insertion_order() {
        let mut entries = IndexMap::new();
        entries.insert("name".to_string(), Value::string("Akshaya"));
        entries.insert("age".to_string(), Value::Number(3.0));
        assert_eq!(
            display(&Value::mapping(entries)),
            "{\"name\": \"Akshaya\", \"age\": 3}"
        );
        assert_eq!(display(&Value::mapping(IndexMap::new())), "{}");
    }
}

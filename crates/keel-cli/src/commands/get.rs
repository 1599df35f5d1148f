use clap::ValueEnum;
use keel_conf::Configuration;

/// Typed accessor used by `keel get --as`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueKind {
    String,
    Int,
    Long,
    Double,
    Float,
    Bool,
    Bytes,
    List,
}

/// Read `key` through the accessor for `kind` and format the result for printing.
pub(super) fn render(
    conf: &Configuration,
    key: &str,
    kind: ValueKind,
    delimiter: &str,
) -> keel_core::Result<String> {
    let out = match kind {
        ValueKind::String => conf.get(key)?,
        ValueKind::Int => conf.get_int(key)?.to_string(),
        ValueKind::Long => conf.get_long(key)?.to_string(),
        ValueKind::Double => conf.get_double(key)?.to_string(),
        ValueKind::Float => conf.get_float(key)?.to_string(),
        ValueKind::Bool => conf.get_boolean(key)?.to_string(),
        ValueKind::Bytes => conf.get_bytes(key)?.to_string(),
        ValueKind::List => conf.get_list(key, delimiter)?.join("\n"),
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::KeelError;

    #[test]
    fn test_render_kinds() {
        let conf = Configuration::empty();
        conf.merge([
            ("port", "19998"),
            ("size", "2KB"),
            ("flag", "TRUE"),
            ("hosts", "a; b ;;c"),
        ])
        .unwrap();

        assert_eq!(render(&conf, "port", ValueKind::Int, ",").unwrap(), "19998");
        assert_eq!(render(&conf, "size", ValueKind::Bytes, ",").unwrap(), "2048");
        assert_eq!(render(&conf, "flag", ValueKind::Bool, ",").unwrap(), "true");
        assert_eq!(render(&conf, "hosts", ValueKind::List, ";").unwrap(), "a\nb\nc");
        assert_eq!(render(&conf, "size", ValueKind::String, ",").unwrap(), "2KB");
    }

    #[test]
    fn test_render_propagates_errors() {
        let conf = Configuration::empty();
        conf.set("size", "huge").unwrap();
        assert!(matches!(
            render(&conf, "size", ValueKind::Int, ","),
            Err(KeelError::TypeMismatch { .. })
        ));
        assert!(matches!(
            render(&conf, "missing", ValueKind::String, ","),
            Err(KeelError::KeyNotFound(_))
        ));
    }
}

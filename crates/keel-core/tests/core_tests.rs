#[cfg(test)]
mod tests {
    use keel_core::*;
    use std::error::Error as _;

    // ── Error display tests ────────────────────────────────────

    #[test]
    fn test_key_not_found_display() {
        let err = KeelError::KeyNotFound("keel.master.hostname".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration key: keel.master.hostname"
        );
    }

    #[test]
    fn test_type_mismatch_names_kind() {
        let err = KeelError::mismatch("keel.worker.rpc.port", MismatchKind::Integer);
        assert!(err.to_string().contains("keel.worker.rpc.port"));
        assert!(err.to_string().contains("not an integer"));

        let err = KeelError::mismatch("keel.user.file.buffer.bytes", MismatchKind::Bytes);
        assert!(err.to_string().contains("not a byte size"));
    }

    #[test]
    fn test_validation_display() {
        let err = KeelError::validation("keel.user.file.buffer.bytes", "too large");
        assert_eq!(
            err.to_string(),
            "config validation failed: keel.user.file.buffer.bytes: too large"
        );
    }

    #[test]
    fn test_class_load_keeps_source() {
        let err = KeelError::ClassLoad {
            name: "keel.MissingAllocator".into(),
            source: anyhow::anyhow!("no type registered"),
        };
        assert!(err.to_string().contains("keel.MissingAllocator"));
        let source = err.source().expect("source is kept");
        assert_eq!(source.to_string(), "no type registered");
    }

    #[test]
    fn test_reference_too_deep_display() {
        let err = KeelError::ReferenceTooDeep {
            name: "k64".into(),
            limit: 64,
        };
        assert_eq!(
            err.to_string(),
            "placeholder k64 nested deeper than 64 references"
        );
    }

    // ── Conversion tests ───────────────────────────────────────

    #[test]
    fn test_error_from_anyhow() {
        let err: KeelError = anyhow::anyhow!("something else").into();
        assert!(matches!(err, KeelError::Other(_)));
        assert_eq!(err.to_string(), "something else");
    }

    #[test]
    fn test_result_alias() {
        fn lookup(found: bool) -> Result<u16> {
            if found {
                Ok(19998)
            } else {
                Err(KeelError::KeyNotFound("keel.master.rpc.port".into()))
            }
        }
        assert_eq!(lookup(true).unwrap(), 19998);
        assert!(lookup(false).is_err());
    }
}

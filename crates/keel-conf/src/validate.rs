//! Cross-key invariants re-checked after every mutation of a [`Configuration`].

use keel_core::{KeelError, Result};

use crate::configuration::Configuration;
use crate::keys;

/// A check run against the whole registry. Failing stops the mutation that triggered it.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, conf: &Configuration) -> Result<()>;
}

/// `keel.user.file.buffer.bytes` must fit in a non-negative 32-bit signed integer.
pub struct UserFileBufferBytes;

impl ValidationRule for UserFileBufferBytes {
    fn name(&self) -> &str {
        "user-file-buffer-bytes"
    }

    fn check(&self, conf: &Configuration) -> Result<()> {
        if !conf.contains_key(keys::USER_FILE_BUFFER_BYTES) {
            return Ok(());
        }
        let bytes = conf.get_bytes(keys::USER_FILE_BUFFER_BYTES)?;
        if (bytes & i32::MAX as i64) != bytes {
            return Err(KeelError::validation(
                keys::USER_FILE_BUFFER_BYTES,
                format!("invalid value {bytes}, must be between 0 and {}", i32::MAX),
            ));
        }
        Ok(())
    }
}

/// Rules every configuration starts with.
pub fn builtin_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![Box::new(UserFileBufferBytes)]
}

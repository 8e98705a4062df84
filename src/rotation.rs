use crate::error::HarvestError;

/// Ordered API key list with a rotation cursor.
///
/// The rotator never touches the network itself. Callers ask for the
/// current key, and advance the cursor when a downstream call fails with a
/// quota-class error. Full-cycle detection (every key tried with zero
/// progress) lives in the caller loops, which know what "progress" means
/// for them.
///
/// One rotator is scoped to one session and passed `&mut` into the
/// harvester and batch fetcher in turn; the cursor position at the end of
/// the harvest phase is where the batch phase starts.
#[derive(Debug, Clone)]
pub struct KeyRotator {
    keys: Vec<String>,
    cursor: usize,
}

impl KeyRotator {
    /// Build a rotator from raw key strings. Blank entries are dropped,
    /// surrounding whitespace trimmed.
    pub fn new(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.into().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys, cursor: 0 }
    }

    /// The active key. Fails only when the key list is empty.
    pub fn current(&self) -> Result<&str, HarvestError> {
        if self.keys.is_empty() {
            return Err(HarvestError::EmptyKeySet);
        }
        Ok(&self.keys[self.cursor % self.keys.len()])
    }

    /// Move to the next key, wrapping modulo the key count.
    pub fn advance(&mut self) {
        if !self.keys.is_empty() {
            self.cursor = (self.cursor + 1) % self.keys.len();
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current cursor position, for full-cycle detection and diagnostics.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_modulo_len() {
        let mut rotator = KeyRotator::new(["a", "b", "c"]);
        let keys = ["a", "b", "c"];
        for k in 0..10 {
            assert_eq!(rotator.current().unwrap(), keys[k % 3]);
            rotator.advance();
        }
    }

    #[test]
    fn test_empty_key_set_is_fatal() {
        let rotator = KeyRotator::new(Vec::<String>::new());
        assert!(matches!(
            rotator.current(),
            Err(HarvestError::EmptyKeySet)
        ));
    }

    #[test]
    fn test_blank_entries_dropped() {
        let rotator = KeyRotator::new(["  key-1  ", "", "   ", "key-2"]);
        assert_eq!(rotator.len(), 2);
        assert_eq!(rotator.current().unwrap(), "key-1");
    }

    #[test]
    fn test_single_key_advance_stays_put() {
        let mut rotator = KeyRotator::new(["only"]);
        rotator.advance();
        rotator.advance();
        assert_eq!(rotator.current().unwrap(), "only");
        assert_eq!(rotator.cursor(), 0);
    }
}

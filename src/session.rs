//! Bookkeeping of which original file became which intermediate

use std::path::{Path, PathBuf};

/// Intermediates produced for one original Logos file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    /// The user's file
    pub original: PathBuf,
    /// De-Logos'ed copy handed to the formatter
    pub intermediate: PathBuf,
    /// Re-Logos'ed result waiting to replace `original` (in-place mode only)
    pub post_format: Option<PathBuf>,
}

/// Ordered record of every file transformed during one run
#[derive(Debug, Default)]
pub struct TransformSession {
    entries: Vec<SessionEntry>,
}

impl TransformSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember that `original` was rewritten into `intermediate`
    pub fn record(&mut self, original: PathBuf, intermediate: PathBuf) {
        self.entries.push(SessionEntry {
            original,
            intermediate,
            post_format: None,
        });
    }

    /// Attach the post-format file to the entry owning `intermediate`
    ///
    /// Returns `false` if no entry has that intermediate.
    pub fn record_post_format(&mut self, intermediate: &Path, post_format: PathBuf) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.intermediate == intermediate)
        {
            Some(entry) => {
                entry.post_format = Some(post_format);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains_original(&self, original: &Path) -> bool {
        self.entries.iter().any(|entry| entry.original == original)
    }

    /// Entries in the order they were recorded
    pub fn iter(&self) -> impl Iterator<Item = &SessionEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_order() {
        let mut session = TransformSession::new();
        session.record(PathBuf::from("b.x"), PathBuf::from("tmp/b-1.m"));
        session.record(PathBuf::from("a.xm"), PathBuf::from("tmp/a-2.mm"));
        session.record(PathBuf::from("c.xi"), PathBuf::from("tmp/c-3.m"));

        let originals: Vec<_> = session.iter().map(|e| e.original.clone()).collect();
        assert_eq!(
            originals,
            vec![
                PathBuf::from("b.x"),
                PathBuf::from("a.xm"),
                PathBuf::from("c.xi")
            ]
        );
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn test_record_post_format() {
        let mut session = TransformSession::new();
        session.record(PathBuf::from("a.x"), PathBuf::from("tmp/a-1.m"));
        assert!(session.record_post_format(Path::new("tmp/a-1.m"), PathBuf::from("tmp/a-2.x")));
        assert!(!session.record_post_format(Path::new("tmp/zzz.m"), PathBuf::from("tmp/z.x")));

        let entry = session.iter().next().unwrap();
        assert_eq!(entry.post_format, Some(PathBuf::from("tmp/a-2.x")));
    }

    #[test]
    fn test_contains_original() {
        let mut session = TransformSession::new();
        assert!(session.is_empty());
        session.record(PathBuf::from("a.x"), PathBuf::from("tmp/a-1.m"));
        assert!(session.contains_original(Path::new("a.x")));
        assert!(!session.contains_original(Path::new("b.x")));
    }
}

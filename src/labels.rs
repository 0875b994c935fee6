//! Class-name lookup for detector outputs.

use crate::util::{DetpostError, DetpostResult};

/// Ordered class names; entry `i` names class-probability slot `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    /// Creates a table from owned names.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Parses one name per line, as in a `coco_classes.txt` asset.
    ///
    /// Trailing `\r` is stripped and blank lines at the end of the text are
    /// ignored. A blank line anywhere else would shift every following class
    /// index and is rejected.
    pub fn from_text(text: &str) -> DetpostResult<Self> {
        let mut lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }

        let mut names = Vec::with_capacity(lines.len());
        for (idx, line) in lines.into_iter().enumerate() {
            let name = line.trim();
            if name.is_empty() {
                return Err(DetpostError::EmptyLabel { line: idx + 1 });
            }
            names.push(name.to_owned());
        }
        Ok(Self { names })
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true when the table has no classes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the name for `class_id`.
    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    /// Returns the name for `class_id`, failing if the index has no entry.
    pub fn resolve(&self, class_id: usize) -> DetpostResult<&str> {
        self.get(class_id)
            .ok_or(DetpostError::ClassIndexOutOfRange {
                index: class_id,
                len: self.names.len(),
            })
    }

    /// Iterates names in class order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub(crate) fn check_matches(&self, num_classes: usize) -> DetpostResult<()> {
        if self.names.len() != num_classes {
            return Err(DetpostError::LabelCountMismatch {
                expected: num_classes,
                got: self.names.len(),
            });
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for LabelTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

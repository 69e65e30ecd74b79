//! Category label encoding

use crate::{Error, Result};

/// Bijection between a fixed label vocabulary and dense integer codes.
///
/// Built once at training time and immutable afterwards. Codes follow
/// lexicographic label order, so refitting on the same label set always
/// reproduces the same mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEncoder {
    /// Vocabulary in code order; strictly ascending.
    classes: Vec<String>,
}

impl CategoryEncoder {
    /// Fit an encoder on observed labels. Duplicates collapse; codes are
    /// assigned in sorted label order.
    pub fn fit<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        classes.sort();
        classes.dedup();

        if classes.is_empty() {
            return Err(Error::Artifact(
                "cannot fit an encoder on an empty label set".to_string(),
            ));
        }

        Ok(Self { classes })
    }

    /// Rebuild an encoder from a persisted vocabulary.
    ///
    /// The stored order is the code assignment, so it must be strictly
    /// ascending; anything else means the artifact was not produced by
    /// this trainer.
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(Error::Artifact(
                "encoder artifact has an empty vocabulary".to_string(),
            ));
        }
        if classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::Artifact(
                "encoder artifact vocabulary is not in sorted order".to_string(),
            ));
        }

        Ok(Self { classes })
    }

    /// Integer code for a label.
    pub fn encode(&self, label: &str) -> Result<u32> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map(|idx| idx as u32)
            .map_err(|_| Error::UnknownCategory(label.to_string()))
    }

    /// Label for an integer code.
    pub fn decode(&self, code: u32) -> Result<&str> {
        self.classes.get(code as usize).map(String::as_str).ok_or_else(|| {
            Error::Artifact(format!(
                "label code {} out of range for vocabulary of {}",
                code,
                self.classes.len()
            ))
        })
    }

    /// Whether a label is in the trained vocabulary.
    pub fn contains(&self, label: &str) -> bool {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .is_ok()
    }

    /// Known vocabulary, in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Vocabulary size.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> CategoryEncoder {
        CategoryEncoder::fit(["Coding", "Arts", "Other", "Sports", "Coding"]).unwrap()
    }

    #[test]
    fn fit_sorts_and_dedupes() {
        let enc = encoder();
        assert_eq!(enc.classes(), &["Arts", "Coding", "Other", "Sports"]);
        assert_eq!(enc.len(), 4);
    }

    #[test]
    fn fit_rejects_empty_label_set() {
        let labels: [&str; 0] = [];
        assert!(CategoryEncoder::fit(labels).is_err());
    }

    #[test]
    fn encode_decode_round_trip() {
        let enc = encoder();
        for label in enc.classes().to_vec() {
            let code = enc.encode(&label).unwrap();
            assert_eq!(enc.decode(code).unwrap(), label);
        }
    }

    #[test]
    fn encode_unknown_label_fails_typed() {
        let enc = encoder();
        let err = enc.encode("Gardening").unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(label) if label == "Gardening"));
    }

    #[test]
    fn decode_out_of_range_code_fails() {
        let enc = encoder();
        assert!(enc.decode(99).is_err());
    }

    #[test]
    fn from_classes_accepts_sorted_vocabulary() {
        let enc = CategoryEncoder::from_classes(vec!["A".into(), "B".into()]).unwrap();
        assert_eq!(enc.encode("B").unwrap(), 1);
    }

    #[test]
    fn from_classes_rejects_unsorted_vocabulary() {
        assert!(CategoryEncoder::from_classes(vec!["B".into(), "A".into()]).is_err());
    }

    #[test]
    fn from_classes_rejects_duplicates() {
        assert!(CategoryEncoder::from_classes(vec!["A".into(), "A".into()]).is_err());
    }

    #[test]
    fn refit_on_same_labels_is_stable() {
        let first = CategoryEncoder::fit(["Sports", "Arts", "Coding"]).unwrap();
        let second = CategoryEncoder::fit(["Coding", "Sports", "Arts"]).unwrap();
        assert_eq!(first, second);
    }
}

use std::{fmt, sync::Arc};

use serde::{Serialize, Serializer};

/// Positions used to reassemble a multi-register value from raw bytes.
///
/// The sequence is immutable and cheap to clone: clones share one allocation,
/// which [`ByteOrder::shares_storage_with`] makes observable. A byte order is
/// replaced as a whole, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByteOrder(Arc<[usize]>);

impl ByteOrder {
    /// Parses a comma separated list of byte positions such as `"1,0,3,2"`.
    ///
    /// Blank text and text containing anything other than non-negative
    /// integers yield `None`: a malformed order means "not specified".
    pub fn parse(text: &str) -> Option<ByteOrder> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        text.split(',')
            .map(|token| token.trim().parse::<usize>().ok())
            .collect::<Option<Vec<_>>>()
            .map(ByteOrder::from)
    }

    /// Text form of an optional byte order, empty when absent.
    pub fn format(byte_order: Option<&ByteOrder>) -> String {
        byte_order.map(|b| b.to_string()).unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn shares_storage_with(&self, other: &ByteOrder) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Vec<usize>> for ByteOrder {
    fn from(positions: Vec<usize>) -> Self {
        ByteOrder(positions.into())
    }
}

impl From<&[usize]> for ByteOrder {
    fn from(positions: &[usize]) -> Self {
        ByteOrder(positions.into())
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, position) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", position)?;
        }
        Ok(())
    }
}

impl Serialize for ByteOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(ByteOrder::parse("1,0").unwrap().as_slice(), &[1, 0]);
        assert_eq!(
            ByteOrder::parse(" 3, 2 ,1,0 ").unwrap().as_slice(),
            &[3, 2, 1, 0]
        );
        assert_eq!(ByteOrder::parse("7").unwrap().as_slice(), &[7]);
    }

    #[test]
    fn test_parse_blank_or_malformed() {
        assert_eq!(ByteOrder::parse(""), None);
        assert_eq!(ByteOrder::parse("   "), None);
        assert_eq!(ByteOrder::parse("a,b"), None);
        assert_eq!(ByteOrder::parse("1,-1"), None);
        assert_eq!(ByteOrder::parse("1,,0"), None);
        assert_eq!(ByteOrder::parse("0123"), Some(ByteOrder::from(vec![123])));
    }

    #[test]
    fn test_format() {
        let byte_order = ByteOrder::from(vec![2, 3, 0, 1]);
        assert_eq!(byte_order.to_string(), "2,3,0,1");
        assert_eq!(ByteOrder::format(Some(&byte_order)), "2,3,0,1");
        assert_eq!(ByteOrder::format(None), "");
        assert_eq!(ByteOrder::parse(&byte_order.to_string()), Some(byte_order));
    }

    #[test]
    fn test_clone_shares_storage() {
        let byte_order = ByteOrder::from(vec![1, 0]);
        let copy = byte_order.clone();
        assert!(copy.shares_storage_with(&byte_order));

        let parsed = ByteOrder::parse("1,0").unwrap();
        assert_eq!(parsed, byte_order);
        assert!(!parsed.shares_storage_with(&byte_order));
    }
}

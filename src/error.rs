//! Errors reported by the invariant checker.
//!
//! Every variant describes a broken red-black invariant. None of them can be produced by the
//! public mutation API; they exist so tests can pinpoint which invariant a bug violated.

use std::error;
use std::fmt;
use std::result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An in-order traversal produced keys out of order.
    UnorderedKeys,
    /// The root of a non-empty tree is red.
    RedRoot,
    /// A red node has a red child.
    RedViolation,
    /// Two paths from the same node reach an absent child through different numbers of black
    /// nodes.
    BlackHeightMismatch { left: usize, right: usize },
    /// A child's parent link does not point back at the node that owns it.
    BrokenParentLink,
    /// The number of reachable nodes differs from the number of allocated nodes.
    LengthMismatch { expected: usize, actual: usize },
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnorderedKeys => write!(f, "in-order traversal is not sorted"),
            Error::RedRoot => write!(f, "root node is red"),
            Error::RedViolation => write!(f, "red node has a red child"),
            Error::BlackHeightMismatch { left, right } => write!(
                f,
                "black height mismatch: left subtree has {}, right subtree has {}",
                left, right,
            ),
            Error::BrokenParentLink => write!(f, "parent link does not match child link"),
            Error::LengthMismatch { expected, actual } => write!(
                f,
                "expected {} reachable nodes, found {}",
                expected, actual,
            ),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_display() {
        assert_eq!(Error::RedRoot.to_string(), "root node is red");
        assert_eq!(
            Error::BlackHeightMismatch { left: 2, right: 3 }.to_string(),
            "black height mismatch: left subtree has 2, right subtree has 3",
        );
        assert_eq!(
            Error::LengthMismatch {
                expected: 4,
                actual: 3
            }
            .to_string(),
            "expected 4 reachable nodes, found 3",
        );
    }
}

//! Tuning knobs for the tree containers.

use serde_derive::{Deserialize, Serialize};

/// Number of nodes per arena chunk used by `TreeConfig::default()`.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Configuration shared by `OrderedTree<T>` and `RedBlackMap<T, U>`.
///
/// Missing fields take their default value when deserializing.
///
/// # Examples
///
/// ```
/// use ordered_tree::config::TreeConfig;
/// use ordered_tree::red_black_tree::OrderedTree;
///
/// let config = TreeConfig { chunk_size: 64 };
/// let mut tree = OrderedTree::with_config(&config);
/// tree.insert(1);
/// assert!(tree.search(&1));
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Number of nodes allocated together in one arena chunk. Zero is treated as one.
    pub chunk_size: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TreeConfig, DEFAULT_CHUNK_SIZE};
    use serde_test::{assert_de_tokens, assert_tokens, Token};

    #[test]
    fn test_default() {
        assert_eq!(TreeConfig::default().chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_serde_tokens() {
        let config = TreeConfig { chunk_size: 16 };
        assert_tokens(
            &config,
            &[
                Token::Struct {
                    name: "TreeConfig",
                    len: 1,
                },
                Token::Str("chunk_size"),
                Token::U64(16),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn test_deserialize_missing_field() {
        assert_de_tokens(
            &TreeConfig::default(),
            &[
                Token::Struct {
                    name: "TreeConfig",
                    len: 0,
                },
                Token::StructEnd,
            ],
        );
    }
}

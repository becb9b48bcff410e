use crate::config::TreeConfig;
use crate::error::Result;
use crate::red_black_tree::tree;
use log::debug;
use std::borrow::Borrow;

/// An ordered collection of keys implemented using a red black tree.
///
/// Unlike `RedBlackMap<T, U>`, equal keys may be inserted more than once: each new copy is
/// placed after the copies already present. Use `search` before `insert` if uniqueness is
/// required.
///
/// The tree is not internally synchronized. Mutation takes `&mut self`, so sharing it between
/// threads requires external locking.
///
/// # Examples
///
/// ```
/// use ordered_tree::red_black_tree::OrderedTree;
///
/// let mut tree = OrderedTree::new();
/// for key in vec![1, 2, 5, 6, 12, 30, 15] {
///     tree.insert(key);
/// }
///
/// assert_eq!(tree.sort(), vec![&1, &2, &5, &6, &12, &15, &30]);
/// assert_eq!(tree.min(), Some(&1));
/// assert_eq!(tree.max(), Some(&30));
/// assert_eq!(tree.successor(&15), Some(&30));
/// assert_eq!(tree.predecessor(&15), Some(&12));
///
/// assert!(tree.delete(&15));
/// assert!(!tree.search(&15));
/// ```
pub struct OrderedTree<T> {
    tree: tree::Tree<T, ()>,
}

impl<T> OrderedTree<T> {
    /// Constructs a new, empty `OrderedTree<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::red_black_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<u32> = OrderedTree::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(&TreeConfig::default())
    }

    /// Constructs a new, empty `OrderedTree<T>` using a specific configuration.
    pub fn with_config(config: &TreeConfig) -> Self {
        OrderedTree {
            tree: tree::Tree::new(config),
        }
    }

    /// Inserts a key into the tree. Keys equal to existing ones are kept and ordered after them.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::red_black_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, key: T)
    where
        T: Ord,
    {
        self.tree.insert(key, ());
    }

    /// Checks if a key exists in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::red_black_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// assert!(!tree.search(&0));
    /// assert!(tree.search(&1));
    /// ```
    pub fn search<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.get(key).is_some()
    }

    /// Removes one occurrence of a key. Returns `false`, leaving the tree untouched, if the key
    /// is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::red_black_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// assert!(tree.delete(&1));
    /// assert!(!tree.delete(&1));
    /// ```
    pub fn delete<V>(&mut self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes one occurrence of a key and returns the stored key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::red_black_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(String::from("a"));
    /// assert_eq!(tree.take("a"), Some(String::from("a")));
    /// assert_eq!(tree.take("a"), None);
    /// ```
    pub fn take<V>(&mut self, key: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.remove(key).map(|entry| entry.key)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every key from the tree.
    pub fn clear(&mut self) {
        debug!("clearing tree of {} keys", self.len());
        self.tree.clear();
    }

    /// Returns the minimum key of the tree. Returns `None` if the tree is empty.
    pub fn min(&self) -> Option<&T> {
        self.tree.min().map(|entry| &entry.key)
    }

    /// Returns the maximum key of the tree. Returns `None` if the tree is empty.
    pub fn max(&self) -> Option<&T> {
        self.tree.max().map(|entry| &entry.key)
    }

    /// Returns the smallest key strictly greater than `key`, whether or not `key` is in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::red_black_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(10);
    /// tree.insert(20);
    /// assert_eq!(tree.successor(&10), Some(&20));
    /// assert_eq!(tree.successor(&15), Some(&20));
    /// assert_eq!(tree.successor(&20), None);
    /// ```
    pub fn successor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.successor(key).map(|entry| &entry.key)
    }

    /// Returns the largest key strictly less than `key`, whether or not `key` is in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::red_black_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(10);
    /// tree.insert(20);
    /// assert_eq!(tree.predecessor(&20), Some(&10));
    /// assert_eq!(tree.predecessor(&15), Some(&10));
    /// assert_eq!(tree.predecessor(&10), None);
    /// ```
    pub fn predecessor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.predecessor(key).map(|entry| &entry.key)
    }

    /// Returns the largest key less than or equal to `key`.
    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.floor(key).map(|entry| &entry.key)
    }

    /// Returns the smallest key greater than or equal to `key`.
    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.ceil(key).map(|entry| &entry.key)
    }

    /// Returns every key in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::red_black_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(3);
    /// tree.insert(1);
    /// tree.insert(3);
    /// assert_eq!(tree.sort(), vec![&1, &3, &3]);
    /// ```
    pub fn sort(&self) -> Vec<&T> {
        self.iter().collect()
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Walks the whole tree and reports the first broken red black invariant, if any.
    pub fn check_invariants(&self) -> Result<()>
    where
        T: Ord,
    {
        self.tree.check(false)
    }

    /// Returns an iterator over the tree. The iterator will yield keys using in-order traversal
    /// and can be recreated at any time to start over.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::red_black_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(3);
    ///
    /// let mut iterator = tree.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> OrderedTreeIter<'_, T> {
        OrderedTreeIter {
            tree_iter: self.tree.iter(),
        }
    }
}

impl<T> IntoIterator for OrderedTree<T> {
    type IntoIter = OrderedTreeIntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            tree_iter: self.tree.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a OrderedTree<T>
where
    T: 'a,
{
    type IntoIter = OrderedTreeIter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `OrderedTree<T>`.
///
/// This iterator traverses the keys of the tree in-order and yields owned keys.
pub struct OrderedTreeIntoIter<T> {
    tree_iter: tree::IntoIter<T, ()>,
}

impl<T> Iterator for OrderedTreeIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.tree_iter.next().map(|entry| entry.key)
    }
}

/// An iterator for `OrderedTree<T>`.
///
/// This iterator traverses the keys of the tree in-order and yields immutable references.
pub struct OrderedTreeIter<'a, T> {
    tree_iter: tree::Iter<'a, T, ()>,
}

impl<'a, T> Iterator for OrderedTreeIter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.tree_iter.next().map(|entry| &entry.key)
    }
}

impl<T> Default for OrderedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

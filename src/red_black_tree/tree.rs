use crate::arena::{Handle, TypedArena};
use crate::config::TreeConfig;
use crate::error::{Error, Result};
use crate::red_black_tree::node::{Color, Entry, Link, Node, Side};
use log::trace;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

/// Where a key belongs in the tree.
enum Position {
    Vacant(Link, Side),
    Occupied(Handle),
}

/// Which neighbour of a query key to look for.
#[derive(Clone, Copy)]
enum Neighbor {
    Floor,
    Ceil,
    Predecessor,
    Successor,
}

/// A red black tree whose nodes live in a typed arena and refer to each other through handles.
///
/// Keys that compare equal may coexist; `insert` places a new key to the right of every equal
/// key, while `insert_or_replace` overwrites the first equal key it finds.
pub struct Tree<T, U> {
    arena: TypedArena<Node<T, U>>,
    root: Link,
}

impl<T, U> Tree<T, U> {
    pub fn new(config: &TreeConfig) -> Self {
        Tree {
            arena: TypedArena::new(config.chunk_size),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    // Every fixup decision goes through here so absent children count as black.
    fn color(&self, link: Link) -> Color {
        match link {
            None => Color::Black,
            Some(handle) => self.arena[handle].color,
        }
    }

    fn is_red(&self, link: Link) -> bool {
        self.color(link) == Color::Red
    }

    fn set_color(&mut self, handle: Handle, color: Color) {
        self.arena[handle].color = color;
    }

    fn parent(&self, handle: Handle) -> Link {
        self.arena[handle].parent
    }

    fn child(&self, handle: Handle, side: Side) -> Link {
        self.arena[handle].child(side)
    }

    fn side_of(&self, handle: Handle) -> Option<Side> {
        self.parent(handle).map(|parent| {
            if self.arena[parent].left == Some(handle) {
                Side::Left
            } else {
                Side::Right
            }
        })
    }

    fn replace_child(&mut self, parent: Link, old: Handle, new: Link) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = &mut self.arena[parent];
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            },
        }
    }

    // Replaces the subtree rooted at `old` with the subtree rooted at `new`. The links of `old`
    // itself are left untouched.
    fn transplant(&mut self, old: Handle, new: Link) {
        let parent = self.parent(old);
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.arena[new].parent = parent;
        }
    }

    /// Moves `handle` down towards `side` and lifts its child on the opposite side into its
    /// place: `Side::Left` is a left rotation, `Side::Right` a right rotation. Colors are not
    /// changed.
    fn rotate(&mut self, handle: Handle, side: Side) {
        let pivot = self
            .child(handle, side.flip())
            .expect("Expected rotated node to have a child opposite the rotation.");
        let inner = self.child(pivot, side);
        self.arena[handle].set_child(side.flip(), inner);
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }

        let parent = self.parent(handle);
        self.arena[pivot].parent = parent;
        self.replace_child(parent, handle, Some(pivot));

        self.arena[pivot].set_child(side, Some(handle));
        self.arena[handle].parent = Some(pivot);
        trace!("rotated {:?} {:?} beneath {:?}", handle, side, pivot);
    }

    fn extreme(&self, mut handle: Handle, side: Side) -> Handle {
        while let Some(child) = self.child(handle, side) {
            handle = child;
        }
        handle
    }

    fn position(&self, key: &T, allow_duplicates: bool) -> Position
    where
        T: Ord,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            side = match key.cmp(&node.entry.key) {
                Ordering::Less => Side::Left,
                Ordering::Equal if !allow_duplicates => return Position::Occupied(handle),
                _ => Side::Right,
            };
            parent = curr;
            curr = node.child(side);
        }
        Position::Vacant(parent, side)
    }

    fn attach(&mut self, parent: Link, side: Side, key: T, value: U) {
        let mut node = Node::new(key, value);
        node.parent = parent;
        let handle = self.arena.allocate(node);
        match parent {
            None => self.root = Some(handle),
            Some(parent) => self.arena[parent].set_child(side, Some(handle)),
        }
        self.insert_fixup(handle);
    }

    /// Inserts a key-value pair, placing it after every entry with an equal key.
    pub fn insert(&mut self, key: T, value: U)
    where
        T: Ord,
    {
        match self.position(&key, true) {
            Position::Vacant(parent, side) => self.attach(parent, side, key, value),
            Position::Occupied(_) => unreachable!(),
        }
    }

    /// Inserts a key-value pair. If an entry with an equal key exists, it is replaced in place and
    /// returned.
    pub fn insert_or_replace(&mut self, key: T, value: U) -> Option<Entry<T, U>>
    where
        T: Ord,
    {
        match self.position(&key, false) {
            Position::Vacant(parent, side) => {
                self.attach(parent, side, key, value);
                None
            },
            Position::Occupied(handle) => {
                Some(mem::replace(&mut self.arena[handle].entry, Entry { key, value }))
            },
        }
    }

    fn insert_fixup(&mut self, mut handle: Handle) {
        while let Some(parent) = self.parent(handle) {
            if self.arena[parent].color == Color::Black {
                break;
            }

            // a red node is never the root
            let grandparent = self
                .parent(parent)
                .expect("Expected red parent node to have a parent.");
            let side = if self.arena[grandparent].left == Some(parent) {
                Side::Left
            } else {
                Side::Right
            };

            match self.child(grandparent, side.flip()) {
                Some(uncle) if self.arena[uncle].color == Color::Red => {
                    trace!("insert fixup: red uncle {:?}, recoloring {:?}", uncle, grandparent);
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    handle = grandparent;
                },
                _ => {
                    let top = if self.child(parent, side.flip()) == Some(handle) {
                        trace!("insert fixup: straightening inner grandchild {:?}", handle);
                        self.rotate(parent, side);
                        handle
                    } else {
                        parent
                    };
                    trace!("insert fixup: promoting {:?} over {:?}", top, grandparent);
                    self.set_color(top, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate(grandparent, side.flip());
                    break;
                },
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Unlinks a node, rebalances the tree and returns the node's entry.
    fn remove_node(&mut self, handle: Handle) -> Entry<T, U> {
        let (left, right) = {
            let node = &self.arena[handle];
            (node.left, node.right)
        };
        let mut removed_color = self.arena[handle].color;

        // `child` takes the place of the node that physically left the tree. It may be absent,
        // so its parent and side are tracked separately.
        let (child, parent, side) = match (left, right) {
            (None, _) | (_, None) => {
                let child = left.or(right);
                let parent = self.parent(handle);
                let side = self.side_of(handle).unwrap_or(Side::Left);
                self.transplant(handle, child);
                (child, parent, side)
            },
            (Some(left), Some(right)) => {
                let successor = self.extreme(right, Side::Left);
                removed_color = self.arena[successor].color;
                let child = self.arena[successor].right;
                let (parent, side) = if successor == right {
                    (successor, Side::Right)
                } else {
                    let parent = self
                        .parent(successor)
                        .expect("Expected successor node to have a parent.");
                    self.transplant(successor, child);
                    self.arena[successor].right = Some(right);
                    self.arena[right].parent = Some(successor);
                    (parent, Side::Left)
                };

                self.transplant(handle, Some(successor));
                self.arena[successor].left = Some(left);
                self.arena[left].parent = Some(successor);
                let color = self.arena[handle].color;
                self.set_color(successor, color);
                (child, Some(parent), side)
            },
        };

        if removed_color == Color::Black {
            self.remove_fixup(child, parent, side);
        }

        self.arena.free(&handle).entry
    }

    // `handle` carries an extra black. `parent` and `side` locate it even when it is absent.
    fn remove_fixup(&mut self, mut handle: Link, mut parent: Link, mut side: Side) {
        while let Some(parent_handle) = parent {
            if self.is_red(handle) {
                break;
            }

            let mut sibling = self
                .child(parent_handle, side.flip())
                .expect("Expected doubly black node to have a sibling.");

            if self.arena[sibling].color == Color::Red {
                trace!("remove fixup: red sibling {:?}", sibling);
                self.set_color(sibling, Color::Black);
                self.set_color(parent_handle, Color::Red);
                self.rotate(parent_handle, side);
                sibling = self
                    .child(parent_handle, side.flip())
                    .expect("Expected doubly black node to have a sibling.");
            }

            let near = self.child(sibling, side);
            let mut far = self.child(sibling, side.flip());

            if !self.is_red(near) && !self.is_red(far) {
                trace!("remove fixup: pushing extra black up to {:?}", parent_handle);
                self.set_color(sibling, Color::Red);
                handle = Some(parent_handle);
                parent = self.parent(parent_handle);
                if let Some(parent_side) = self.side_of(parent_handle) {
                    side = parent_side;
                }
                continue;
            }

            if !self.is_red(far) {
                trace!("remove fixup: rotating red near nephew {:?} outward", near);
                if let Some(near) = near {
                    self.set_color(near, Color::Black);
                }
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.flip());
                sibling = self
                    .child(parent_handle, side.flip())
                    .expect("Expected doubly black node to have a sibling.");
                far = self.child(sibling, side.flip());
            }

            trace!("remove fixup: red far nephew {:?}, rotating {:?}", far, parent_handle);
            let parent_color = self.arena[parent_handle].color;
            self.set_color(sibling, parent_color);
            self.set_color(parent_handle, Color::Black);
            if let Some(far) = far {
                self.set_color(far, Color::Black);
            }
            self.rotate(parent_handle, side);
            handle = self.root;
            break;
        }

        if let Some(handle) = handle {
            self.set_color(handle, Color::Black);
        }
    }

    fn find<V>(&self, key: &V) -> Link
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Removes one entry whose key equals `key`.
    pub fn remove<V>(&mut self, key: &V) -> Option<Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.find(key).map(|handle| self.remove_node(handle))
    }

    pub fn get<V>(&self, key: &V) -> Option<&Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.find(key).map(|handle| &self.arena[handle].entry)
    }

    pub fn get_mut<V>(&mut self, key: &V) -> Option<&mut Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        match self.find(key) {
            Some(handle) => Some(&mut self.arena[handle].entry),
            None => None,
        }
    }

    pub fn min(&self) -> Option<&Entry<T, U>> {
        self.root
            .map(|root| &self.arena[self.extreme(root, Side::Left)].entry)
    }

    pub fn max(&self) -> Option<&Entry<T, U>> {
        self.root
            .map(|root| &self.arena[self.extreme(root, Side::Right)].entry)
    }

    fn neighbor<V>(&self, key: &V, neighbor: Neighbor) -> Option<&Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut ret = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            let ordering = key.cmp(node.entry.key.borrow());
            let (accept, side) = match neighbor {
                Neighbor::Floor => (ordering != Ordering::Less, Side::Right),
                Neighbor::Predecessor => (ordering == Ordering::Greater, Side::Right),
                Neighbor::Ceil => (ordering != Ordering::Greater, Side::Left),
                Neighbor::Successor => (ordering == Ordering::Less, Side::Left),
            };
            // an accepted node is the best answer so far; keep looking for a closer one
            if accept {
                ret = Some(handle);
                curr = node.child(side);
            } else {
                curr = node.child(side.flip());
            }
        }
        ret.map(|handle| &self.arena[handle].entry)
    }

    /// Returns the entry with the largest key less than or equal to `key`.
    pub fn floor<V>(&self, key: &V) -> Option<&Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.neighbor(key, Neighbor::Floor)
    }

    /// Returns the entry with the smallest key greater than or equal to `key`.
    pub fn ceil<V>(&self, key: &V) -> Option<&Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.neighbor(key, Neighbor::Ceil)
    }

    /// Returns the entry with the largest key strictly less than `key`.
    pub fn predecessor<V>(&self, key: &V) -> Option<&Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.neighbor(key, Neighbor::Predecessor)
    }

    /// Returns the entry with the smallest key strictly greater than `key`.
    pub fn successor<V>(&self, key: &V) -> Option<&Entry<T, U>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.neighbor(key, Neighbor::Successor)
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut ret = 0;
        let mut stack: Vec<(Handle, usize)> = self.root.into_iter().map(|root| (root, 1)).collect();
        while let Some((handle, depth)) = stack.pop() {
            ret = ret.max(depth);
            let node = &self.arena[handle];
            for child in [node.left, node.right].iter().flatten() {
                stack.push((*child, depth + 1));
            }
        }
        ret
    }

    /// Verifies every red black invariant. With `strict` set, equal keys are also rejected.
    pub fn check(&self, strict: bool) -> Result<()>
    where
        T: Ord,
    {
        if let Some(root) = self.root {
            if self.arena[root].parent.is_some() {
                return Err(Error::BrokenParentLink);
            }
            if self.arena[root].color == Color::Red {
                return Err(Error::RedRoot);
            }
            self.black_height(root)?;
        }

        let mut count = 0;
        let mut prev: Option<&T> = None;
        for entry in self.iter() {
            if let Some(prev) = prev {
                match prev.cmp(&entry.key) {
                    Ordering::Greater => return Err(Error::UnorderedKeys),
                    Ordering::Equal if strict => return Err(Error::UnorderedKeys),
                    _ => {},
                }
            }
            prev = Some(&entry.key);
            count += 1;
        }

        if count != self.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: count,
            });
        }
        Ok(())
    }

    fn black_height(&self, handle: Handle) -> Result<usize> {
        let node = &self.arena[handle];
        let mut heights = [1, 1];
        for (index, link) in [node.left, node.right].iter().enumerate() {
            if let Some(child) = *link {
                let child_node = &self.arena[child];
                if child_node.parent != Some(handle) {
                    return Err(Error::BrokenParentLink);
                }
                if node.color == Color::Red && child_node.color == Color::Red {
                    return Err(Error::RedViolation);
                }
                heights[index] = self.black_height(child)?;
            }
        }

        if heights[0] != heights[1] {
            return Err(Error::BlackHeightMismatch {
                left: heights[0],
                right: heights[1],
            });
        }
        match node.color {
            Color::Black => Ok(heights[0] + 1),
            Color::Red => Ok(heights[0]),
        }
    }

    pub fn iter(&self) -> Iter<'_, T, U> {
        Iter {
            tree: self,
            current: self.root,
            stack: Vec::new(),
        }
    }
}

impl<T, U> IntoIterator for Tree<T, U> {
    type IntoIter = IntoIter<T, U>;
    type Item = Entry<T, U>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            arena: self.arena,
            current: self.root,
            stack: Vec::new(),
        }
    }
}

/// An in-order iterator over the entries of a `Tree<T, U>`.
pub struct Iter<'a, T, U> {
    tree: &'a Tree<T, U>,
    current: Link,
    stack: Vec<Handle>,
}

impl<'a, T, U> Iterator for Iter<'a, T, U> {
    type Item = &'a Entry<T, U>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        while let Some(handle) = self.current {
            self.current = tree.arena[handle].left;
            self.stack.push(handle);
        }
        self.stack.pop().map(|handle| {
            let node = &tree.arena[handle];
            self.current = node.right;
            &node.entry
        })
    }
}

/// An owning in-order iterator over the entries of a `Tree<T, U>`. Nodes are released from the
/// arena as they are yielded.
pub struct IntoIter<T, U> {
    arena: TypedArena<Node<T, U>>,
    current: Link,
    stack: Vec<Handle>,
}

impl<T, U> Iterator for IntoIter<T, U> {
    type Item = Entry<T, U>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(handle) = self.current {
            self.current = self.arena[handle].left;
            self.stack.push(handle);
        }
        self.stack.pop().map(|handle| {
            let node = self.arena.free(&handle);
            self.current = node.right;
            node.entry
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Tree;
    use crate::config::TreeConfig;
    use crate::error::Error;
    use crate::red_black_tree::node::{Color, Side};

    fn tree_from(keys: &[u32]) -> Tree<u32, ()> {
        let mut tree = Tree::new(&TreeConfig::default());
        for key in keys {
            tree.insert(*key, ());
            tree.check(false).unwrap();
        }
        tree
    }

    fn keys(tree: &Tree<u32, ()>) -> Vec<u32> {
        tree.iter().map(|entry| entry.key).collect()
    }

    #[test]
    fn test_rotate_preserves_order() {
        let mut tree = tree_from(&[2, 1, 4, 3, 5]);
        let root = tree.root.unwrap();
        assert_eq!(tree.arena[root].entry.key, 2);

        tree.rotate(root, Side::Left);
        let new_root = tree.root.unwrap();
        assert_eq!(tree.arena[new_root].entry.key, 4);
        assert_eq!(tree.arena[new_root].parent, None);
        assert_eq!(tree.arena[root].parent, Some(new_root));
        assert_eq!(keys(&tree), vec![1, 2, 3, 4, 5]);

        tree.rotate(new_root, Side::Right);
        assert_eq!(tree.root, Some(root));
        assert_eq!(keys(&tree), vec![1, 2, 3, 4, 5]);
        assert_eq!(tree.check(true), Ok(()));
    }

    #[test]
    #[should_panic]
    fn test_rotate_without_child() {
        let mut tree = tree_from(&[1]);
        let root = tree.root.unwrap();
        tree.rotate(root, Side::Left);
    }

    #[test]
    fn test_insert_fixup_recolors_root() {
        let tree = tree_from(&[1, 2, 3]);
        let root = tree.root.unwrap();
        assert_eq!(tree.arena[root].entry.key, 2);
        assert_eq!(tree.arena[root].color, Color::Black);
        assert_eq!(tree.color(tree.arena[root].left), Color::Red);
        assert_eq!(tree.color(tree.arena[root].right), Color::Red);
    }

    #[test]
    fn test_insert_inner_grandchild() {
        let tree = tree_from(&[3, 1, 2]);
        let root = tree.root.unwrap();
        assert_eq!(tree.arena[root].entry.key, 2);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_absent_link_is_black() {
        let tree: Tree<u32, ()> = tree_from(&[]);
        assert_eq!(tree.color(None), Color::Black);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut tree = tree_from(&[5, 5, 5, 3]);
        assert_eq!(tree.len(), 4);
        assert_eq!(keys(&tree), vec![3, 5, 5, 5]);
        assert_eq!(tree.check(true), Err(Error::UnorderedKeys));

        assert!(tree.remove(&5).is_some());
        assert_eq!(keys(&tree), vec![3, 5, 5]);
        tree.check(false).unwrap();
    }

    #[test]
    fn test_insert_or_replace() {
        let mut tree = Tree::new(&TreeConfig::default());
        assert!(tree.insert_or_replace(1, 'a').is_none());
        let old = tree.insert_or_replace(1, 'b').unwrap();
        assert_eq!((old.key, old.value), (1, 'a'));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&1).map(|entry| entry.value), Some('b'));
    }

    #[test]
    fn test_remove_every_shape() {
        let keys_in = [8, 4, 12, 2, 6, 10, 14, 1, 3, 5, 7, 9, 11, 13, 15];
        for removed in &keys_in {
            let mut tree = tree_from(&keys_in);
            assert_eq!(tree.remove(removed).map(|entry| entry.key), Some(*removed));
            tree.check(true).unwrap();
            let expected: Vec<u32> = (1..16).filter(|key| key != removed).collect();
            assert_eq!(keys(&tree), expected);
        }
    }

    #[test]
    fn test_remove_to_empty() {
        let mut tree = tree_from(&[2, 1, 3]);
        for key in &[1, 3, 2] {
            assert!(tree.remove(key).is_some());
            tree.check(true).unwrap();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.remove(&2).is_none());
    }

    #[test]
    fn test_neighbors_with_duplicates() {
        let tree = tree_from(&[1, 3, 3, 3, 5]);
        assert_eq!(tree.successor(&3).map(|entry| entry.key), Some(5));
        assert_eq!(tree.predecessor(&3).map(|entry| entry.key), Some(1));
        assert_eq!(tree.floor(&3).map(|entry| entry.key), Some(3));
        assert_eq!(tree.ceil(&3).map(|entry| entry.key), Some(3));
        assert_eq!(tree.successor(&5).map(|entry| entry.key), None);
        assert_eq!(tree.predecessor(&1).map(|entry| entry.key), None);
    }

    #[test]
    fn test_check_detects_red_root() {
        let mut tree = tree_from(&[1]);
        let root = tree.root.unwrap();
        tree.set_color(root, Color::Red);
        assert_eq!(tree.check(false), Err(Error::RedRoot));
    }

    #[test]
    fn test_check_detects_black_height_mismatch() {
        let mut tree = tree_from(&[2, 1, 3]);
        let root = tree.root.unwrap();
        let left = tree.arena[root].left.unwrap();
        tree.set_color(left, Color::Black);
        assert_eq!(
            tree.check(false),
            Err(Error::BlackHeightMismatch { left: 2, right: 1 }),
        );
    }

    #[test]
    fn test_check_detects_red_violation() {
        let mut tree = tree_from(&[2, 1, 3, 4]);
        let root = tree.root.unwrap();
        let right = tree.arena[root].right.unwrap();
        tree.set_color(right, Color::Red);
        assert_eq!(tree.check(false), Err(Error::RedViolation));
    }

    #[test]
    fn test_check_detects_broken_parent_link() {
        let mut tree = tree_from(&[2, 1, 3]);
        let root = tree.root.unwrap();
        let left = tree.arena[root].left.unwrap();
        tree.arena[left].parent = None;
        assert_eq!(tree.check(false), Err(Error::BrokenParentLink));
    }

    #[test]
    fn test_into_iter_releases_nodes() {
        let tree = tree_from(&[3, 1, 2]);
        let entries: Vec<u32> = tree.into_iter().map(|entry| entry.key).collect();
        assert_eq!(entries, vec![1, 2, 3]);
    }
}

use crate::arena::Handle;

/// A possibly-absent reference to a node. `None` stands for a black leaf.
pub type Link = Option<Handle>;

/// A key-value pair stored in a node.
#[derive(Debug)]
pub struct Entry<T, U> {
    pub key: T,
    pub value: U,
}

/// An enum representing the color of a node in a red black tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// Which child slot of its parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn flip(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A struct representing an internal node of a red black tree.
///
/// `left` and `right` own their subtrees; `parent` is only used to walk back up.
pub struct Node<T, U> {
    pub entry: Entry<T, U>,
    pub color: Color,
    pub parent: Link,
    pub left: Link,
    pub right: Link,
}

impl<T, U> Node<T, U> {
    pub fn new(key: T, value: U) -> Self {
        Node {
            entry: Entry { key, value },
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
        }
    }

    pub fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn set_child(&mut self, side: Side, link: Link) {
        match side {
            Side::Left => self.left = link,
            Side::Right => self.right = link,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Node, Side};

    #[test]
    fn test_new_node_is_red_leaf() {
        let node = Node::new(1, 'a');
        assert_eq!(node.color, Color::Red);
        assert!(node.parent.is_none());
        assert!(node.child(Side::Left).is_none());
        assert!(node.child(Side::Right).is_none());
    }

    #[test]
    fn test_side_flip() {
        assert_eq!(Side::Left.flip(), Side::Right);
        assert_eq!(Side::Right.flip(), Side::Left);
    }
}

use crate::types::{Color, Dir, Handle};

/// An occupied tree position.
///
/// Liveness is carried by the value slot: a live node holds `Some(value)`,
/// a tombstone holds `None` and keeps its key so the position can be
/// reactivated without touching the structure.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub key: K,
    pub value: Option<V>,
    pub color: Color,
    pub left: Handle,
    pub right: Handle,
    pub parent: Handle,
}

impl<K, V> Node<K, V> {
    /// A freshly activated node: live, red, with two empty children.
    pub fn new(key: K, value: V, parent: Handle) -> Self {
        Self {
            key,
            value: Some(value),
            color: Color::Red,
            left: Handle::NIL,
            right: Handle::NIL,
            parent,
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn child(&self, dir: Dir) -> Handle {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    #[inline]
    pub fn set_child(&mut self, dir: Dir, child: Handle) {
        match dir {
            Dir::Left => self.left = child,
            Dir::Right => self.right = child,
        }
    }
}

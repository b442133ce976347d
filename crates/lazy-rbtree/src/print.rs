use std::fmt::Debug;

use crate::arena::Arena;
use crate::types::{Color, Handle};

/// Debug printer for the node graph under `h`.
///
/// Tombstones are printed with their key and a `†` in place of the value.
pub(crate) fn print<K, V>(arena: &Arena<K, V>, h: Handle, tab: &str) -> String
where
    K: Debug,
    V: Debug,
{
    if h.is_nil() {
        return "∅".to_string();
    }

    let n = arena.node(h);
    let color = match n.color {
        Color::Black => "black",
        Color::Red => "red",
    };
    let child_tab = format!("{tab}  ");
    let left = print(arena, n.left, &child_tab);
    let right = print(arena, n.right, &child_tab);
    let payload = match &n.value {
        Some(v) => format!("{:?} = {v:?}", n.key),
        None => format!("{:?} †", n.key),
    };
    format!(
        "Node[{}] {color} {{ {payload} }}\n{tab}L={left}\n{tab}R={right}",
        h.index()
    )
}

use std::collections::HashMap;

use crate::error::{TiffFormatError, TiffResult};
use crate::tags::IfdPointer;

/// Detects cycles in the chain of next-IFD pointers.
///
/// A well formed chain is a list: every directory has at most one successor and no directory is
/// reachable from itself. Directories are not necessarily visited in chain order, so every pointer
/// is assigned to a chain with union find. A link between two pointers already in the same chain
/// closes a cycle.
#[derive(Default, Debug)]
pub struct IfdCycles {
    /// The recorded successor of every directory.
    next: HashMap<IfdPointer, Option<IfdPointer>>,
    nodes: HashMap<IfdPointer, usize>,
    parent: Vec<usize>,
}

impl IfdCycles {
    pub fn new() -> Self {
        IfdCycles::default()
    }

    /// Record the successor of `from`. Returns `false` if exactly this link was known.
    pub fn insert_next(&mut self, from: IfdPointer, to: Option<IfdPointer>) -> TiffResult<bool> {
        match self.next.get(&from) {
            Some(known) if *known == to => return Ok(false),
            // The same directory was read twice with different successors.
            Some(_) => return Err(TiffFormatError::CycleInOffsets.into()),
            None => {}
        }
        self.next.insert(from, to);

        let from = self.node(from);
        if let Some(to) = to {
            let to = self.node(to);
            let (head, tail) = (self.root(from), self.root(to));
            if head == tail {
                return Err(TiffFormatError::CycleInOffsets.into());
            }
            self.parent[tail] = head;
        }

        Ok(true)
    }

    /// Check if a directory was read already.
    pub fn contains(&self, ifd: IfdPointer) -> bool {
        self.next.contains_key(&ifd)
    }

    fn node(&mut self, ifd: IfdPointer) -> usize {
        let parent = &mut self.parent;
        *self.nodes.entry(ifd).or_insert_with(|| {
            parent.push(parent.len());
            parent.len() - 1
        })
    }

    fn root(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Compress.
        while self.parent[node] != root {
            let up = self.parent[node];
            self.parent[node] = root;
            node = up;
        }

        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_are_detected() {
        let mut cycles = IfdCycles::new();

        cycles
            .insert_next(IfdPointer(0x20), Some(IfdPointer(0x800)))
            .expect("non-existing link is valid");

        cycles
            .insert_next(IfdPointer(0x800), Some(IfdPointer(0x20)))
            .expect_err("cycle must be detected");
    }

    #[test]
    fn reflective_cycle() {
        let mut cycles = IfdCycles::new();

        cycles
            .insert_next(IfdPointer(0x20), Some(IfdPointer(0x20)))
            .expect_err("self-referential cycle must be detected");
    }

    #[test]
    fn chains_joined_out_of_order() {
        let mut cycles = IfdCycles::new();

        cycles
            .insert_next(IfdPointer(0x20), Some(IfdPointer(0x40)))
            .expect("non-existing link is valid");
        cycles
            .insert_next(IfdPointer(0x60), Some(IfdPointer(0x80)))
            .expect("non-existing link is valid");
        cycles
            .insert_next(IfdPointer(0x80), Some(IfdPointer(0x20)))
            .expect("joining two chains is valid");

        cycles
            .insert_next(IfdPointer(0x40), Some(IfdPointer(0x60)))
            .expect_err("closing the joined chain is a cycle");
    }

    #[test]
    fn repeated_links() {
        let mut cycles = IfdCycles::new();

        assert!(cycles.insert_next(IfdPointer(0x20), None).unwrap());
        assert!(!cycles.insert_next(IfdPointer(0x20), None).unwrap());
        assert!(cycles.contains(IfdPointer(0x20)));
        cycles
            .insert_next(IfdPointer(0x20), Some(IfdPointer(0x40)))
            .expect_err("a second successor is a cycle");
    }
}

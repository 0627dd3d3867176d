use crate::handle::NodeId;

/// A split at `start` that rejoins at `end`.
///
/// A bubble whose start has a single braid is degenerate: `end` is then
/// simply the next node and there are no inner bubbles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PogBubble {
    pub start: NodeId,
    pub end: NodeId,
    pub inner_bubbles: Vec<PogBubble>,
    pub depth: usize,
}

impl PogBubble {
    pub fn new(start: NodeId, end: NodeId, depth: usize) -> Self {
        PogBubble {
            start,
            end,
            inner_bubbles: Vec::new(),
            depth,
        }
    }

    /// The number of bubbles nested inside this one, at any depth.
    pub fn nested_count(&self) -> usize {
        self.inner_bubbles
            .iter()
            .map(|b| 1 + b.nested_count())
            .sum()
    }

    /// Iterates over this bubble and every bubble nested in it,
    /// outermost first.
    pub fn iter(&self) -> impl Iterator<Item = &PogBubble> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.inner_bubbles.iter().rev());
            Some(next)
        })
    }
}

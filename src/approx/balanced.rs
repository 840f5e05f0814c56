//! Balanced approximator for bidirectional A*
//!
//! Both searches share one potential: with `h_t(n)` the estimate from `n` to
//! the target and `h_s(n)` the estimate from the source to `n`,
//!
//! ```text
//! forward(n)  = h_t(s) / 2 + (h_t(n) - h_s(n)) / 2
//! backward(n) = h_s(t) / 2 + (h_s(n) - h_t(n)) / 2
//! ```
//!
//! `forward(n) <= h_t(n)` and `backward(n) <= h_s(n)` follow from the
//! triangle inequality of the underlying estimate, so both stay admissible.
//! Their sum is the constant `(h_t(s) + h_s(t)) / 2`, a lower bound of the
//! whole route. Values are clamped at zero so a label's priority never drops
//! below its real weight.

use crate::graph::{Direction, NodeId};

use super::WeightApproximator;

pub struct BalancedApproximator<'a> {
    approx: Box<dyn WeightApproximator + 'a>,
    from: NodeId,
    to: NodeId,
    from_offset: f64,
    to_offset: f64,
}

impl<'a> BalancedApproximator<'a> {
    pub fn new(approx: Box<dyn WeightApproximator + 'a>) -> Self {
        Self {
            approx,
            from: 0,
            to: 0,
            from_offset: 0.0,
            to_offset: 0.0,
        }
    }

    /// Anchor both directions. Call before every query.
    pub fn set_from_to(&mut self, from: NodeId, to: NodeId) {
        self.from = from;
        self.to = to;
        self.from_offset = 0.5 * self.approx.approximate(from, to);
        self.to_offset = 0.5 * self.approx.approximate(from, to);
    }

    pub fn from_to(&self) -> (NodeId, NodeId) {
        (self.from, self.to)
    }

    /// Estimate of the remaining cost toward the opposite endpoint of `dir`
    pub fn approximate(&self, node: NodeId, dir: Direction) -> f64 {
        let to_target = self.approx.approximate(node, self.to);
        let from_source = self.approx.approximate(self.from, node);
        let delta = 0.5 * (from_source - to_target);
        let estimate = match dir {
            Direction::Forward => self.to_offset - delta,
            Direction::Backward => self.from_offset + delta,
        };
        estimate.max(0.0)
    }

    pub fn approximation(&self) -> &dyn WeightApproximator {
        self.approx.as_ref()
    }
}

impl std::fmt::Debug for BalancedApproximator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalancedApproximator")
            .field("approx", &self.approx.name())
            .field("from", &self.from)
            .field("to", &self.to)
            .field("from_offset", &self.from_offset)
            .field("to_offset", &self.to_offset)
            .finish()
    }
}

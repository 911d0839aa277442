//! Feature source port

use crate::types::Position;

/// Produces a fixed-length feature (firing-rate) vector at any position.
///
/// Implementations must support evaluation at arbitrary query points, not
/// just the agent's current location: the policy advisor takes finite
/// differences around the agent and snapshots scan the whole arena.
///
/// # Examples
///
/// ```
/// use tdnav::ports::FeatureSource;
/// use tdnav::types::Position;
///
/// struct Bias;
///
/// impl FeatureSource for Bias {
///     fn dimension(&self) -> usize {
///         1
///     }
///
///     fn evaluate(&self, _position: Position) -> Vec<f64> {
///         vec![1.0]
///     }
/// }
///
/// assert_eq!(Bias.evaluate(Position::new(0.2, 0.3)), vec![1.0]);
/// ```
pub trait FeatureSource {
    /// Number of features N. Must not change over the source's lifetime.
    fn dimension(&self) -> usize;

    /// Feature vector of length [`dimension`](Self::dimension) at `position`.
    fn evaluate(&self, position: Position) -> Vec<f64>;

    /// Human-readable name used in logs.
    fn name(&self) -> &str {
        "features"
    }
}

use strum::Display;

/// Lifecycle of a [`ResultAggregator`](super::ResultAggregator).
///
/// `Clean` moves to `Accumulating` on the first pair, and either moves to `Failed` when
/// an error is recorded. Nothing leaves `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AggregatorState {
    Clean,
    Accumulating,
    Failed,
}

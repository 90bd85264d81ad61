//! PulseLab Core: streaming indicators and per-bar strategy decisions.
//!
//! This crate turns a sequence of price bars into one trading action per bar:
//! - Domain types (bars and the validated bar buffer, positions, actions)
//! - Streaming indicators that never look past the current bar
//! - Crossover detection and protective-level calculation
//! - The strategy contract, eleven variants and the pullback state machine
//! - A registry mapping variant ids and parameter maps to strategy instances
//!
//! There is no I/O here. Bars come in, actions go out, and the caller owns
//! the position state that is fed back on the next bar.

pub mod components;
pub mod domain;
pub mod error;
pub mod indicators;

pub use error::CoreError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a replay hands across threads is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::BarSeries>();
        require_sync::<domain::BarSeries>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Action>();
        require_sync::<domain::Action>();

        // Component types
        require_send::<components::Series>();
        require_sync::<components::Series>();
        require_send::<components::OrderIntent>();
        require_sync::<components::OrderIntent>();
        require_send::<components::StrategyInstance>();
        require_sync::<components::StrategyInstance>();
        require_send::<components::strategy::PullbackMachine>();
        require_sync::<components::strategy::PullbackMachine>();

        // Errors
        require_send::<CoreError>();
        require_sync::<CoreError>();
    }

    /// Architecture contract: strategies see positions only as a read-only reference.
    ///
    /// `decide` takes `&Position`; a strategy that wanted to mutate position
    /// state would need a different trait signature, breaking every variant.
    #[test]
    fn strategy_trait_reads_position_by_reference() {
        fn _check_trait_object_builds(
            strategy: &mut dyn components::Strategy,
            bars: &domain::BarSeries,
            position: &domain::Position,
        ) -> domain::Action {
            strategy.decide(bars, position)
        }
    }
}

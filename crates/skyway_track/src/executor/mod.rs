//! # Command Executors
//!
//! The [`Dispatcher`] pops opcodes from the command buffer and hands each one
//! to the executor for its family. It is the only place opcodes are
//! interpreted, and it enforces the per-call budget.

mod addons;
mod landscape;

pub use addons::AddonsExecutor;
pub use landscape::LandscapeExecutor;

use crate::assets::AddonAssets;
use crate::command::{Budget, Command, CommandBuffer, LandscapeOp};
use crate::config::TrackConfig;
use crate::error::TrackResult;
use crate::structure::Structure;

/// Owns the command buffer and both executors.
#[derive(Debug)]
pub struct Dispatcher {
    commands: CommandBuffer,
    landscape: LandscapeExecutor,
    addons: AddonsExecutor,
    executed: u64,
}

impl Dispatcher {
    /// Builds the pipeline, including the guardian tile.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TrackError::InvalidConfig`] if the config does not
    /// validate.
    pub fn new(config: &TrackConfig, assets: AddonAssets) -> TrackResult<Self> {
        let landscape = LandscapeExecutor::new(config)?;
        Ok(Self {
            commands: CommandBuffer::new(config.command_capacity),
            landscape,
            addons: AddonsExecutor::new(config, assets),
            executed: 0,
        })
    }

    /// Queues a structure.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TrackError::Capacity`] if too many structures wait.
    pub fn enqueue_structure(&mut self, structure: Box<dyn Structure>) -> TrackResult<()> {
        self.landscape.enqueue(structure)
    }

    /// Runs opcodes until the budget is spent or there is nothing left to do.
    /// An idle buffer with structures waiting gets a `StartStructure`, which
    /// counts against the budget.
    ///
    /// Returns the number of opcodes executed.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failing opcode's error.
    pub fn generate_chunks(&mut self, budget: Budget) -> TrackResult<usize> {
        let mut executed = 0;
        while !budget.exhausted(executed) {
            if self.commands.is_empty() {
                if !self.landscape.has_waiting() {
                    break;
                }
                self.commands.push(LandscapeOp::StartStructure)?;
            }
            let Some(command) = self.commands.pop() else {
                break;
            };
            self.dispatch(command)?;
            executed += 1;
        }
        self.executed += executed as u64;
        Ok(executed)
    }

    fn dispatch(&mut self, command: Command) -> TrackResult<()> {
        tracing::trace!("Dispatch {:?}", command);
        match command {
            Command::Landscape(op) => self.landscape.execute(op, &mut self.commands, &mut self.addons),
            Command::Addons(op) => self.addons.execute(op, self.landscape.builder()),
        }
    }

    /// Whether nothing is queued or waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.commands.is_empty() && !self.landscape.has_waiting()
    }

    /// Queued opcodes.
    #[inline]
    #[must_use]
    pub const fn commands(&self) -> &CommandBuffer {
        &self.commands
    }

    /// The landscape executor.
    #[inline]
    #[must_use]
    pub const fn landscape(&self) -> &LandscapeExecutor {
        &self.landscape
    }

    /// The landscape executor, mutably.
    #[inline]
    pub fn landscape_mut(&mut self) -> &mut LandscapeExecutor {
        &mut self.landscape
    }

    /// The addons executor.
    #[inline]
    #[must_use]
    pub const fn addons(&self) -> &AddonsExecutor {
        &self.addons
    }

    /// The addons executor, mutably.
    #[inline]
    pub fn addons_mut(&mut self) -> &mut AddonsExecutor {
        &mut self.addons
    }

    /// Opcodes executed over the dispatcher's lifetime.
    #[inline]
    #[must_use]
    pub const fn executed(&self) -> u64 {
        self.executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addon::AddonKind;
    use crate::error::TrackError;
    use crate::structure::{AddonEmitter, Chicane, Curve, LandscapeEmitter, Straight};

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&TrackConfig::test(), AddonAssets::headless()).unwrap()
    }

    #[test]
    fn test_drain_runs_everything() {
        let mut dispatcher = dispatcher();
        dispatcher.enqueue_structure(Box::new(Straight::new(3))).unwrap();

        // Start + 3 segments + finish + addon start + coin + hazards + addon finish
        let executed = dispatcher.generate_chunks(Budget::Drain).unwrap();
        assert!(executed >= 8);
        assert!(dispatcher.is_idle());
        assert_eq!(dispatcher.landscape().builder().tile_count(), 4);
        assert_eq!(dispatcher.executed(), executed as u64);
    }

    #[test]
    fn test_budget_caps_work() {
        let mut dispatcher = dispatcher();
        dispatcher.enqueue_structure(Box::new(Straight::new(5))).unwrap();

        assert_eq!(dispatcher.generate_chunks(Budget::Ops(2)).unwrap(), 2);
        // StartStructure then one segment
        assert_eq!(dispatcher.landscape().builder().tile_count(), 2);
        assert_eq!(dispatcher.generate_chunks(Budget::Ops(0)).unwrap(), 0);
    }

    #[test]
    fn test_idle_returns_zero() {
        let mut dispatcher = dispatcher();
        assert_eq!(dispatcher.generate_chunks(Budget::Drain).unwrap(), 0);
        assert_eq!(dispatcher.generate_chunks(Budget::Ops(10)).unwrap(), 0);
    }

    #[test]
    fn test_addon_phase_follows_own_tiles() {
        let mut dispatcher = dispatcher();
        dispatcher.enqueue_structure(Box::new(Straight::new(2))).unwrap();

        // Start + 2 segments + finish. The grid holds the guardian's rows and
        // tile 1's; tile 2 is still provisional.
        dispatcher.generate_chunks(Budget::Ops(4)).unwrap();
        let queued: Vec<Command> = dispatcher.commands().iter().copied().collect();
        assert!(matches!(
            queued.first(),
            Some(Command::Addons(crate::command::AddonOp::StartStructureAddons { rows: 8, cols: 3, .. }))
        ));
        assert!(matches!(
            queued.last(),
            Some(Command::Addons(crate::command::AddonOp::FinishStructureAddons))
        ));
    }

    #[test]
    fn test_nested_children_expand_in_place() {
        let mut dispatcher = dispatcher();
        dispatcher.enqueue_structure(Box::new(Chicane::new(2, 0.2))).unwrap();
        dispatcher.enqueue_structure(Box::new(Straight::new(1))).unwrap();
        dispatcher.generate_chunks(Budget::Drain).unwrap();

        let builder = dispatcher.landscape().builder();
        // Guardian + chicane (1 + 2 + 2 + 1) + straight
        assert_eq!(builder.tile_count(), 8);
        assert!(builder.horizontal_angle().abs() < 1e-5);
        assert_eq!(dispatcher.landscape().open_depth(), 0);

        let turns: Vec<f32> = builder.tiles().map(|t| t.forward().x).collect();
        // Right-hand curve first: tiles 2..=3 bend toward +X
        assert!(turns[2] > 0.0 && turns[3] > turns[2]);
    }

    struct Nesting(u32);

    impl Structure for Nesting {
        fn name(&self) -> &str {
            "nesting"
        }

        fn emit_landscape(&self, out: &mut LandscapeEmitter<'_>) {
            out.lift(self.0 as f32);
            out.segment();
            if self.0 > 0 {
                out.nest(Box::new(Nesting(self.0 - 1)));
                out.nest(Box::new(Nesting(self.0 - 1)));
            }
        }

        fn emit_addons(&self, _out: &mut AddonEmitter<'_>, _rows: usize, _cols: usize) {}
    }

    #[test]
    fn test_nested_order_is_depth_first() {
        let mut dispatcher = dispatcher();
        dispatcher.enqueue_structure(Box::new(Nesting(2))).unwrap();
        dispatcher.generate_chunks(Budget::Drain).unwrap();

        // Pre-order walk of a binary tree of depth 2: 2, 1, 0, 0, 1, 0, 0
        let builder = dispatcher.landscape().builder();
        let steps: Vec<f32> = (1..builder.tile_count())
            .map(|i| {
                let tile = builder.tile(i).unwrap();
                let below = builder.tile(i - 1).unwrap();
                tile.near_left().y - below.far_left().y
            })
            .collect();
        assert_eq!(steps, vec![2.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    struct Greedy;

    impl Structure for Greedy {
        fn name(&self) -> &str {
            "greedy"
        }

        fn emit_landscape(&self, out: &mut LandscapeEmitter<'_>) {
            out.segment();
        }

        fn emit_addons(&self, out: &mut AddonEmitter<'_>, rows: usize, _cols: usize) {
            out.reserve_random_vertical(AddonKind::Saw, rows + 1);
        }
    }

    #[test]
    fn test_oversize_request_propagates() {
        let mut dispatcher = dispatcher();
        dispatcher.enqueue_structure(Box::new(Greedy)).unwrap();
        assert!(matches!(
            dispatcher.generate_chunks(Budget::Drain),
            Err(TrackError::NoFit { .. })
        ));
    }

    #[test]
    fn test_waiting_queue_bounded() {
        let config = TrackConfig {
            max_waiting_structures: 1,
            ..TrackConfig::test()
        };
        let mut dispatcher = Dispatcher::new(&config, AddonAssets::headless()).unwrap();
        dispatcher.enqueue_structure(Box::new(Curve::new(1, 0.1))).unwrap();
        assert!(matches!(
            dispatcher.enqueue_structure(Box::new(Curve::new(1, 0.1))),
            Err(TrackError::Capacity { .. })
        ));
    }
}

// Pipelines: the phase worker pool, the two-phase training orchestrator,
// and the suggestion path.

pub mod pool;
pub mod suggest;
pub mod train;

//! Turn rules: possession, set-piece classification and touch budgeting
//!
//! ```text
//! host loop ──events──▶ RuleEngine ──TurnOutcome──▶ presentation / AI
//!                          │
//!                          ├── TouchBudget (global + current disk)
//!                          └── TurnFlags   (latched first contact + ball event)
//! ```

pub mod rule_engine;
pub mod snapshot;
pub mod touch_budget;
pub mod types;

pub use rule_engine::RuleEngine;
pub use snapshot::RuleSnapshot;
pub use touch_budget::TouchBudget;
pub use types::{BallAction, BallEvent, FirstContact, RuleState, TurnFlags, TurnOutcome};

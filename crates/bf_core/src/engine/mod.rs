pub mod ai; // Computer-controlled teams (Dummy / Fuzzy / Decourt)
pub mod config; // Presets and tuning for rules, forces and AI
pub mod execution_noise; // Seeded execution error for AI flicks
pub mod force; // Distance calibration and force vectors
pub mod rules; // Turn resolution, touch budget, restarts

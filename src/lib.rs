//! **stepmazes** builds and solves perfect mazes on a rectangular grid one step at a time.
//!
//! Builders (`generators`) and solvers (`pathing`) keep all of their progress in their own state,
//! so a render loop or test can advance them at whatever pace it likes. `session` ties a grid, a
//! builder, a solver and a route together.

pub mod cells;
pub mod disjoint_set;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod pathing;
pub mod renderers;
pub mod session;
pub mod units;
pub mod walls;

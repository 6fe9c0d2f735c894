pub mod ai;
pub mod entity;
pub mod grid;
pub mod interact;
pub mod placement;
pub mod rng;
pub mod rules;
pub mod tile;
pub mod tutorial;

pub mod control;
pub mod timer;
pub mod visuals;

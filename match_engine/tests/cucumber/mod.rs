mod match_world;
mod setups;
mod steps;

pub use match_world::MatchWorld;

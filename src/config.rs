//! Settings for the player, layered from defaults, a TOML file and
//! `ENCORE__*` environment variables.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;

mod planet;
mod player;

pub use planet::{NewPlanet, Planet};
pub use player::{NewPlayer, Player};

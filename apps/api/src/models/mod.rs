pub mod game;
pub mod review;

pub mod draw;
pub mod event;
pub mod highscore;
pub mod level;
pub mod pack;
pub mod player;
pub mod session;
pub mod step;

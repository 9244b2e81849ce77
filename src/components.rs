pub mod actions;
pub mod bracket;
pub mod info;
pub mod standings;
pub mod theme;

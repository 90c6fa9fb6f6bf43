pub mod csgo;
pub mod index;

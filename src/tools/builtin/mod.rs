//! Built-in demonstration tools.
//!
//! - `weather`: canned weather report for a city
//! - `wiki`: Wikipedia page summary lookup
//! - `fun_fact`: canned trivia about a topic
//! - `random_color`: random pick from a caller-supplied list

pub mod fun_fact;
pub mod random_color;
pub mod weather;
pub mod wiki;

pub use fun_fact::FunFactTool;
pub use random_color::RandomColorTool;
pub use weather::WeatherTool;
pub use wiki::WikiSearchTool;

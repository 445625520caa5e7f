/*!
 * Terminal Front-end
 * Maps keys to engine commands and draws engine snapshots
 */

mod app;
pub mod input;
pub mod render;

pub use app::{run, Clock};

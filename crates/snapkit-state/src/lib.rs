mod layout;
mod snap_state;
mod store;

pub use layout::{default_user_prefix, user_prefix_from, StateLayout};
pub use snap_state::SnapState;
pub use store::{State, StateData};

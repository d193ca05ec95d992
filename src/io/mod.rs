//! External collaborators: the host link and the end effector.

mod end_effector;
mod transport;

pub use end_effector::{EndEffector, GpioEndEffector};
pub use transport::Transport;

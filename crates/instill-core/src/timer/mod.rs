mod countdown;

pub use countdown::{CountdownTimer, Tick};

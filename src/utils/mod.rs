pub mod interrupt;

pub use interrupt::{Interrupt, InterruptReason};

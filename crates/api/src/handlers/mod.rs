//! Request handlers, grouped by lifecycle concern.

pub mod amendment;
pub mod confirm;
pub mod contract;
pub mod invitation;
pub mod review;

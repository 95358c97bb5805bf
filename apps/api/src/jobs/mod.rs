// Public job board and resume submission.

pub mod handlers;
pub mod store;
pub mod validation;

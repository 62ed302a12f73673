//! Library side of `navctl`: scenario files, replay, reporting, and logging.

pub mod logging;
pub mod replay;
pub mod scenario;
pub mod summary;

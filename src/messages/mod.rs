mod message_type;
mod problem_report;

pub use message_type::*;
pub use problem_report::*;

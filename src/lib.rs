pub mod analyze;
pub mod github;
pub mod model;
pub mod report;
pub mod utils;

pub mod analytics;
pub mod month;
pub mod observation;

pub use analytics::*;
pub use month::*;
pub use observation::*;

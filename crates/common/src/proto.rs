mod reading;
mod timestamp;
mod token;

pub use reading::*;
pub use timestamp::*;
pub use token::*;

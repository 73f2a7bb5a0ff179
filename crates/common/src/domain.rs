mod credential;
mod reading;
mod result;

pub use credential::*;
pub use reading::*;
pub use result::*;

pub mod input;
pub mod reply;
pub mod request;
pub mod result;

pub use input::*;
pub use reply::*;
pub use request::*;
pub use result::*;

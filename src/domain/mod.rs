pub mod user;
pub mod venue;
pub mod booking;
pub mod rating;
pub mod payment;

pub use user::*;
pub use venue::*;
pub use booking::*;
pub use rating::*;
pub use payment::*;

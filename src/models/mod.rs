pub mod gallery;
pub mod media;
pub mod user;

pub use gallery::*;
pub use media::*;
pub use user::*;

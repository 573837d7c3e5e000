pub mod user;
pub mod course;
pub mod enrollment;
pub mod announcement;
pub mod reaction;
pub mod comment;
pub mod material;

pub use user::*;
pub use course::*;
pub use enrollment::*;
pub use announcement::*;
pub use reaction::*;
pub use comment::*;
pub use material::*;

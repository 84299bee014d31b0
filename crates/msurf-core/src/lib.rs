pub mod error;
pub mod id;
pub mod tolerance;
pub mod traits;

pub use error::{Result, SurfaceError};
pub use id::SurfaceId;
pub use tolerance::Tolerance;
pub use traits::Validate;

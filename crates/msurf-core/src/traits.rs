use crate::error::Result;

/// Eagerly check a configuration before any work is done with it.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

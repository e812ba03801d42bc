//! An assortment of non-owning containers.
//!
//! All of these containers have some option to construct them from one (or more) slices of the
//! underlying types instead of allocating resources dynamically.
mod partial;
mod pool;
mod slice;

pub use self::partial::Partial;
pub use self::pool::Pool;
pub use self::slice::Slice;

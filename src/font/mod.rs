mod bitmap;
mod store;
mod traits;

pub use bitmap::*;
pub use store::*;
pub use traits::*;

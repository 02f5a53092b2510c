pub mod lomax;
pub mod uniform;

pub use lomax::Lomax;
pub use uniform::Uniform;

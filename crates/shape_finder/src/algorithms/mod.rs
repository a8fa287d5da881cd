pub mod preprocessing;
pub mod binarization;
pub mod selection;
pub mod extraction;
pub mod filtering;
pub mod classification;
pub mod discrimination;

pub use preprocessing::*;
pub use binarization::*;
pub use selection::*;
pub use extraction::*;
pub use filtering::*;
pub use classification::*;
pub use discrimination::*;

pub mod demo;
pub mod random;

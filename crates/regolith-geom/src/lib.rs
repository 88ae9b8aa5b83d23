pub mod mass;

pub use mass::MassProps;

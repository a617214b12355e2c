pub mod featured;
pub mod sample;
pub mod warehouse;

pub use featured::FeaturedProvider;
pub use sample::SampleProvider;
pub use warehouse::WarehouseProvider;

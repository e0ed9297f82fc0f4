pub mod azure;
pub mod null;

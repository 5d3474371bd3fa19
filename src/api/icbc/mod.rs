pub mod gold;

pub use gold::IcbcGoldSource;

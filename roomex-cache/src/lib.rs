mod cache;

pub use cache::{asset_count, asset_url, intern_asset, AssetId, Atom};

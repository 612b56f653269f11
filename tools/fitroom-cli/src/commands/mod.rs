pub mod check;
pub mod composite;
pub mod snapshot;
pub mod wardrobe;

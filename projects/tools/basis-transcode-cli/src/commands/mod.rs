pub mod info;
pub mod sizes;

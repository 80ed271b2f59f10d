pub mod locks;
pub mod time;

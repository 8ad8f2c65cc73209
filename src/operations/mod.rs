pub mod boolean;
pub mod divide;
pub mod offset;

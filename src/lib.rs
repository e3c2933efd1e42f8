pub mod core;
pub mod external;
pub mod transport;

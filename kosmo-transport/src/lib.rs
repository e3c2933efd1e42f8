pub mod lcd;

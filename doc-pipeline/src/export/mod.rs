pub mod markdown;
pub mod save_all;

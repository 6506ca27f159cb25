pub mod db;
pub mod engine;

//! Repositories for database operations

pub mod idea;

pub use idea::IdeaRepository;

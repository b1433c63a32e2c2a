pub mod admin;
pub mod health;
pub mod practice_sessions;

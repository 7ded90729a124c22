//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod availability;
pub mod conversation;
pub mod enrollment;
pub mod enums;
pub mod message;
pub mod review;
pub mod session;
pub mod student_profile;
pub mod tutor_profile;
pub mod user;

// Re-exports per facilitare l'import
pub use availability::{DaySchedule, TimeRange, WeeklyAvailability};
pub use conversation::Conversation;
pub use enrollment::ClassEnrollment;
pub use enums::{SessionStatus, UserRole};
pub use message::Message;
pub use review::Review;
pub use session::Session;
pub use student_profile::StudentProfile;
pub use tutor_profile::TutorProfile;
pub use user::User;

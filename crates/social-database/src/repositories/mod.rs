//! Repository implementations for platform entities.

pub mod message;
pub mod notification;
pub mod user;

pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use user::UserRepository;

pub mod controller;
pub mod transcript;

pub use controller::ConversationController;
pub use transcript::{Message, Role, Transcript};

pub mod service;
pub mod local;
pub mod session;

pub use local::{GameStatus, LocalService};
pub use service::{topic, FeedMessage, GameService, ServiceError, Subscription};
pub use session::{Session, SessionConfig, SessionError};

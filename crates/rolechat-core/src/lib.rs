pub mod ai;
pub mod config;
pub mod error;
pub mod preferences;
pub mod roles;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{GeminiClient, Generator, HistoryEntry};
pub use config::{Config, GenerationConfig, SettingsField};
pub use error::GenerationError;
pub use preferences::{Gate, Preferences};
pub use roles::{find_role, templates_for, AIRole, Icon, PromptTemplate, ROLES};
pub use session::{build_history, ChatSession, PendingTurn, MODEL};
pub use state::{Message, MessageId, MessageRole};

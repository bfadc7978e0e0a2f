//! In-memory UI state and the actions that mutate it.
//!
//! Every store follows the same action contract: set the loading flag,
//! perform the API call, on success update local state and re-fetch the
//! owning collection so the view reflects what the gateway confirmed, on
//! failure record the error string and leave prior state untouched, finally
//! clear the loading flag.

pub mod conversation;
pub mod implementations;
pub mod keys;
pub mod models;
pub mod order;
pub mod presets;
pub mod providers;

pub use conversation::{ConversationStore, TurnState};
pub use implementations::ImplStore;
pub use keys::KeyStore;
pub use models::ModelStore;
pub use order::MoveDirection;
pub use presets::PresetStore;
pub use providers::{ProviderStore, QuotaStore};

//! In-memory doubles for the four ports.
//!
//! These back the library's own tests and let host applications exercise
//! their session wiring without any hosted service. Each double emulates the
//! behavior the real adapters exhibit (account creation signs the new user
//! in, deleting the signed-in account signs it out, merge writes
//! shallow-merge) and offers failure injection for the degraded paths.

mod identity;
mod navigation;
mod storage;
mod store;

pub use identity::MemoryIdentityProvider;
pub use navigation::{FakeNavigator, Mechanism, Navigation};
pub use storage::MemoryStorage;
pub use store::MemoryDocumentStore;

pub mod webhook_repo;
pub use webhook_repo::{PgWebhookRepository, WebhookRepository};
pub mod credential_repo;
pub use credential_repo::{ApiCredentialRepository, PgApiCredentialRepository};
pub mod sale_repo;
pub use sale_repo::{PgSaleRepository, SaleRepository};
pub mod profile_repo;
pub use profile_repo::{PgProfileRepository, ProfileRepository};

pub mod memory;
pub use memory::InMemoryStore;

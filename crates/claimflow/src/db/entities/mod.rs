//! Database entities.

pub mod client_document;
pub mod invoice;
pub mod stage;
pub mod stage_history;

pub use client_document::Entity as ClientDocument;
pub use invoice::Entity as Invoice;
pub use stage::Entity as Stage;
pub use stage::PrimaryStatus;
pub use stage_history::Entity as StageHistory;

//! Party aggregate
//!
//! Tenants (locatários) and landlords (locadores) registered by a user.

pub mod model;
pub mod repository;

pub use model::{
    LinkedContract, MaritalRegime, MaritalStatus, Party, PartyDeletion, PartyDraft, PartyRole,
    PartySummary, PartyWithContracts, PersonFields,
};
pub use repository::PartyRepository;

//! Contract aggregate
//!
//! Lease contracts, their parties and the generated legal text.

pub mod model;
pub mod repository;
pub mod template;

pub use model::{
    Contract, ContractFilter, ContractStats, ContractWithParties, NewContract, STATUS_ACTIVE,
    STATUS_REVIEWING,
};
pub use repository::ContractRepository;
pub use template::{build_contract_text, LeaseTerms};

// Chain delivery queues (filled by the external indexing runtime)
pub mod evm_call_traces;
pub mod evm_logs;

// Marketplace entities
pub mod payment;
pub mod pending_sale;
pub mod project;
pub mod sale;
pub mod sale_entry;
pub mod sale_lookup_table;
pub mod token;

// Re-exports for convenience
pub use evm_call_traces::EvmCallTraces;
pub use evm_logs::EvmLogs;

pub use payment::Payment;
pub use pending_sale::PendingSale;
pub use project::Project;
pub use sale::Sale;
pub use sale_entry::SaleEntry;
pub use sale_lookup_table::SaleLookupTable;
pub use token::Token;

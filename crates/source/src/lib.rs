//! `stockbridge-source` — the ERP read path.
//!
//! Queries an Odoo-style ERP over XML-RPC for serialized stock restricted
//! to configured brands and storage locations, and shapes the result into
//! brand-grouped [`stockbridge_core::InventoryItem`]s. Read-only: nothing
//! in this crate writes anywhere.

pub mod client;
pub mod inventory;
pub mod xmlrpc;

pub use client::{OdooClient, OdooRpc, SourceError};
pub use inventory::InventorySource;
pub use xmlrpc::{Value, XmlRpcError};

//! Supabase adapters: PostgREST record store, storage blob store and the
//! delivered-events log.

mod blob_store;
mod card_store;
mod client;
mod event_log;

pub use blob_store::SupabaseBlobStore;
pub use card_store::SupabaseCardStore;
pub use client::SupabaseClient;
pub use event_log::SupabaseEventLog;

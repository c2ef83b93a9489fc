pub mod backend;
pub mod client;
pub mod supabase;

pub use backend::{AuthProvider, BackendContext, RowStore, connect};
pub use client::FeedClient;
pub use supabase::SupabaseClient;

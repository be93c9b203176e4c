pub mod supabase;

pub use supabase::{eq, or_eq, SupabaseClient};

//! Database layer (Supabase PostgREST).

pub mod supabase;

pub use supabase::SupabaseDb;

/// Table names as constants.
pub mod tables {
    pub const VERIFICATION_HISTORY: &str = "verification_history";
}

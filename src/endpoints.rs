//! The API endpoint URIs.

/// The route to list and create accounts.
pub const ACCOUNTS: &str = "/api/accounts";
/// The route to list categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to compute the aggregate statistics.
pub const STATS: &str = "/api/stats";
/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";

//! Per-database rendering of literal values.

/// Renders literals so the narrowed SQL parses on the remote database.
pub trait DbProduct: Send + Sync {
    /// Wraps a `yyyy-MM-dd` string into a date literal.
    fn wrap_date(&self, date: &str) -> String;
}

pub struct MySql;

impl DbProduct for MySql {
    fn wrap_date(&self, date: &str) -> String {
        format!("DATE('{}')", date)
    }
}

pub struct Oracle;

impl DbProduct for Oracle {
    fn wrap_date(&self, date: &str) -> String {
        format!("to_date('{}','YYYY-MM-DD')", date)
    }
}

/// ANSI date literal. Used for PostgreSQL and any product not listed in the registry.
pub struct Ansi;

impl DbProduct for Ansi {
    fn wrap_date(&self, date: &str) -> String {
        format!("date '{}'", date)
    }
}

/// Product name prefixes, lower case.
static REGISTRY: &[(&str, &dyn DbProduct)] = &[
    ("mysql", &MySql),
    ("oracle", &Oracle),
    ("postgresql", &Ansi),
];

/// Looks up the dialect for a database product name such as `MySQL` or `Oracle`.
///
/// Matching is a case-insensitive prefix match. Unknown products get the ANSI dialect.
///
/// # Arguments
///
/// * `db_name` - Product name reported by the JDBC driver.
pub fn db_product(db_name: &str) -> &'static dyn DbProduct {
    let normalized = db_name.trim().to_lowercase();
    for (prefix, product) in REGISTRY {
        if normalized.starts_with(*prefix) {
            return *product;
        }
    }
    debug!("No dialect registered for {:?}, using ANSI date literals", db_name);
    &Ansi
}

//! Database engine identification
//!
//! A connection targets exactly one [`Engine`] and reports a free-form server
//! version string. Both are resolved once, when the catalog for that
//! connection is built, and every version-dependent decision afterwards keys
//! off the parsed [`ServerVersion`].

use core::cmp::Ordering;
use core::fmt;

/// Relational engine family a connection talks to
///
/// # Examples
///
/// ```
/// use schemata_types::Engine;
///
/// assert_eq!(Engine::detect("mysql", "10.4.12-MariaDB"), Some(Engine::MariaDb));
/// assert_eq!(Engine::detect("mysql", "8.0.33"), Some(Engine::MySql));
/// assert_eq!(Engine::detect("sqlsrv", "15.00.2000"), Some(Engine::SqlServer));
/// assert_eq!(Engine::detect("oracle", "19.0"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Engine {
    /// Oracle MySQL
    MySql,
    /// MariaDB, which speaks the MySQL protocol but reports metadata differently
    MariaDb,
    /// Microsoft SQL Server
    SqlServer,
}

impl Engine {
    /// Resolve the engine from a driver name and the server version string.
    ///
    /// MariaDB servers answer on the MySQL driver, so the version string is the
    /// only thing that tells the two apart.
    #[must_use]
    pub fn detect(driver: &str, server_version: &str) -> Option<Self> {
        if driver.eq_ignore_ascii_case("mysql") || driver.eq_ignore_ascii_case("mariadb") {
            if contains_ignore_ascii_case(server_version, "mariadb") {
                Some(Engine::MariaDb)
            } else {
                Some(Engine::MySql)
            }
        } else if driver.eq_ignore_ascii_case("sqlsrv")
            || driver.eq_ignore_ascii_case("mssql")
            || driver.eq_ignore_ascii_case("sqlserver")
            || driver.eq_ignore_ascii_case("dblib")
        {
            Some(Engine::SqlServer)
        } else {
            None
        }
    }

    /// Whether this engine belongs to the MySQL protocol family
    #[inline]
    #[must_use]
    pub const fn is_mysql_family(&self) -> bool {
        matches!(self, Engine::MySql | Engine::MariaDb)
    }

    /// Lowercase engine name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Engine::MySql => "mysql",
            Engine::MariaDb => "mariadb",
            Engine::SqlServer => "sqlserver",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Numeric server version, compared component-wise
///
/// # Examples
///
/// ```
/// use schemata_types::ServerVersion;
///
/// let v = ServerVersion::parse("5.5.5-10.2.3-MariaDB-1:10.2.3+maria~jessie").unwrap();
/// assert_eq!(v, ServerVersion::new(10, 2, 3));
/// assert!(ServerVersion::parse("8.0.33-0ubuntu0.22.04.2").unwrap() >= ServerVersion::new(8, 0, 16));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a server-reported version string.
    ///
    /// Trailing distribution suffixes (`-0ubuntu0.22.04.2`, `-MariaDB-log`) are
    /// ignored. MariaDB servers that advertise the `5.5.5-` replication prefix
    /// report their real version after it.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let raw = match raw.strip_prefix("5.5.5-") {
            Some(rest) if contains_ignore_ascii_case(rest, "mariadb") => rest,
            _ => raw,
        };

        let numeric: &str = raw
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()
            .unwrap_or("");

        let mut parts = numeric.split('.').filter(|p| !p.is_empty());
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        Some(Self::new(major, minor, patch))
    }

    /// Whether `self` falls in `[since, until)`; open bounds are `None`
    #[must_use]
    pub fn within(&self, since: Option<ServerVersion>, until: Option<ServerVersion>) -> bool {
        since.is_none_or(|s| *self >= s) && until.is_none_or(|u| *self < u)
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

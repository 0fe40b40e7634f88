//! The narrow seam to the connection/execution layer

use std::sync::Arc;

use crate::error::ConnectionError;
use crate::row::{CaseFolding, Row};

/// What the metadata layer needs from a live connection
///
/// Implementations wrap a real driver. Introspection runs synchronously on
/// the caller's thread and inherits whatever timeout the driver applies.
pub trait Connection: Send + Sync {
    /// Run one SQL statement and collect its rows
    fn execute(&self, sql: &str) -> Result<Vec<Row>, ConnectionError>;

    /// Driver name, e.g. `mysql` or `sqlsrv`
    fn driver_name(&self) -> &str;

    /// Server version string exactly as the server reports it
    fn server_version(&self) -> &str;

    /// Key casing applied by the driver to result rows
    fn case_folding(&self) -> CaseFolding {
        CaseFolding::Natural
    }
}

impl<C: Connection + ?Sized> Connection for &C {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, ConnectionError> {
        (**self).execute(sql)
    }

    fn driver_name(&self) -> &str {
        (**self).driver_name()
    }

    fn server_version(&self) -> &str {
        (**self).server_version()
    }

    fn case_folding(&self) -> CaseFolding {
        (**self).case_folding()
    }
}

impl<C: Connection + ?Sized> Connection for Arc<C> {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, ConnectionError> {
        (**self).execute(sql)
    }

    fn driver_name(&self) -> &str {
        (**self).driver_name()
    }

    fn server_version(&self) -> &str {
        (**self).server_version()
    }

    fn case_folding(&self) -> CaseFolding {
        (**self).case_folding()
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, ConnectionError> {
        (**self).execute(sql)
    }

    fn driver_name(&self) -> &str {
        (**self).driver_name()
    }

    fn server_version(&self) -> &str {
        (**self).server_version()
    }

    fn case_folding(&self) -> CaseFolding {
        (**self).case_folding()
    }
}

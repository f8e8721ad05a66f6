//! Resource kinds managed through the CRUD endpoints.

use std::fmt;
use std::str::FromStr;

/// A remote entity type managed via CRUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Customer/supplier contacts.
    Contacts,
    /// Catalog items (products and services).
    Catalog,
    /// Sales invoices.
    Invoices,
}

impl ResourceKind {
    /// URL path segment for the collection.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Catalog => "catalog",
            Self::Invoices => "invoices",
        }
    }

    /// Human-readable singular noun, used in log lines.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Contacts => "contact",
            Self::Catalog => "catalog item",
            Self::Invoices => "invoice",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "contacts" => Ok(Self::Contacts),
            "catalog" => Ok(Self::Catalog),
            "invoices" => Ok(Self::Invoices),
            other => Err(format!(
                "unknown resource `{other}` (expected contacts, catalog, or invoices)"
            )),
        }
    }
}

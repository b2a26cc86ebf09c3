//! Member and type accessibility

use std::fmt;

use serde::{Deserialize, Serialize};

/// JVMS 4.1 access level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Private,
    /// Package access
    #[default]
    #[serde(alias = "package")]
    Default,
    Protected,
    Public,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Private => "private",
            Self::Default => "/*default*/",
            Self::Protected => "protected",
            Self::Public => "public",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_package_access() {
        assert_eq!(Access::default(), Access::Default);
        let parsed: Access = serde_json::from_str("\"package\"").unwrap();
        assert_eq!(parsed, Access::default());
        assert!(Access::Private < Access::default() && Access::default() < Access::Protected);
    }
}

use serde::{Deserialize, Serialize};

/// Unique identifier for a module (e.g. `M00001`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(pub String);

impl ModuleId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_ordering() {
        let mut ids = vec![ModuleId::new("M00010"), ModuleId::new("M00002")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "M00002");
        assert_eq!(format!("{}", ids[1]), "M00010");
    }
}

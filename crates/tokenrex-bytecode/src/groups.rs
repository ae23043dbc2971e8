use indexmap::IndexMap;

/// Bidirectional mapping between capture group indices and their optional
/// names, in declaration order. Group `0` is always present and reserved
/// for the whole match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTable {
    names: IndexMap<usize, String>,
}

impl GroupTable {
    pub fn new() -> Self {
        let mut table = Self {
            names: IndexMap::new(),
        };
        table.names.insert(0, "<global>".to_string());
        table
    }

    /// Registers a new capture group and returns its index. `name` is
    /// `None` for purely numbered groups.
    pub fn declare(&mut self, name: Option<&str>) -> usize {
        let index = self.names.len();
        self.names
            .insert(index, name.unwrap_or_default().to_string());
        index
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names
            .get(&index)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty() && *s != "<global>")
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(idx, _)| *idx)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_group_is_preregistered() {
        let table = GroupTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.name_of(0), None); // "<global>" filtered as non-empty special name
    }

    #[test]
    fn declare_assigns_increasing_indices() {
        let mut table = GroupTable::new();
        let a = table.declare(Some("year"));
        let b = table.declare(None);
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(table.index_of("year"), Some(1));
        assert_eq!(table.name_of(2), None);
    }
}

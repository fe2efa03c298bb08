use std::collections::{BTreeMap, HashMap};

/// Per-world table from numeric block id to its stable name.
///
/// Numeric ids are assigned per world, so two worlds can only be compared
/// through the names. Iteration is in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    names: BTreeMap<i16, String>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the name for `id`. Returns the previous name.
    pub fn insert(&mut self, id: i16, name: impl Into<String>) -> Option<String> {
        self.names.insert(id, name.into())
    }

    pub fn get(&self, id: i16) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: i16) -> bool {
        self.names.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i16, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// First id (in iteration order) carrying `name`.
    pub fn id_for_name(&self, name: &str) -> Option<i16> {
        self.iter().find(|(_, n)| *n == name).map(|(id, _)| id)
    }

    /// Reverse index, name -> first id carrying it.
    pub fn name_index(&self) -> HashMap<&str, i16> {
        let mut index = HashMap::with_capacity(self.names.len());
        for (id, name) in self.iter() {
            index.entry(name).or_insert(id);
        }
        index
    }

    /// Rename entries through `transformer` (old name -> new name).
    /// Ids are kept. Returns how many entries were renamed.
    pub fn remap_names(&mut self, transformer: &HashMap<String, String>) -> usize {
        let mut renamed = 0;
        for name in self.names.values_mut() {
            if let Some(new_name) = transformer.get(name.as_str()) {
                *name = new_name.clone();
                renamed += 1;
            }
        }
        renamed
    }
}

impl FromIterator<(i16, String)> for IdMap {
    fn from_iter<T: IntoIterator<Item = (i16, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(i16, &'a str)> for IdMap {
    fn from_iter<T: IntoIterator<Item = (i16, &'a str)>>(iter: T) -> Self {
        iter.into_iter().map(|(id, name)| (id, name.to_string())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_reverse() {
        let map: IdMap = [(1, "minecraft:stone"), (9, "minecraft:water"), (3, "minecraft:stone")]
            .into_iter()
            .collect();
        assert_eq!(map.get(9), Some("minecraft:water"));
        assert!(!map.contains(2));
        // ascending id order, first match wins
        assert_eq!(map.id_for_name("minecraft:stone"), Some(1));
        assert_eq!(map.name_index()["minecraft:stone"], 1);
        assert_eq!(map.id_for_name("minecraft:dirt"), None);
    }

    #[test]
    fn test_remap_names() {
        let mut map: IdMap = [(1, "old:a"), (2, "old:b")].into_iter().collect();
        let transformer = HashMap::from([("old:a".to_string(), "new:a".to_string())]);
        assert_eq!(map.remap_names(&transformer), 1);
        assert_eq!(map.get(1), Some("new:a"));
        assert_eq!(map.get(2), Some("old:b"));
    }
}

use crate::distribution::Distribution;

/// As close to uniform as whole percentages allow.
pub const FAIR: Distribution =
    Distribution::new_unchecked([17, 17, 17, 17, 16, 16]);
pub const SLOPED: Distribution =
    Distribution::new_unchecked([47, 23, 16, 8, 4, 2]);
pub const VALLEY: Distribution =
    Distribution::new_unchecked([40, 8, 2, 3, 9, 38]);
pub const HILL: Distribution =
    Distribution::new_unchecked([2, 12, 40, 38, 7, 1]);
pub const ALTERNATING: Distribution =
    Distribution::new_unchecked([32, 0, 32, 0, 32, 4]);

/// Named distributions, in the order they are offered to the user.
#[derive(Debug, Clone)]
pub struct Presets {
    entries: Vec<(String, Distribution)>,
}

impl Default for Presets {
    fn default() -> Self {
        let entries = [
            ("Fair", FAIR),
            ("Sloped", SLOPED),
            ("Valley", VALLEY),
            ("Hill", HILL),
            ("Alternating", ALTERNATING),
        ]
        .into_iter()
        .map(|(name, d)| (name.to_string(), d))
        .collect();
        Self { entries }
    }
}

impl Presets {
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<Distribution> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| *d)
    }

    /// Add a preset, replacing any existing one with the same name.
    pub fn add(&mut self, name: impl Into<String>, distribution: Distribution) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = distribution,
            None => self.entries.push((name, distribution)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_presets_are_valid() {
        let presets = Presets::default();
        for name in presets.names() {
            let d = presets.get(name).unwrap();
            assert!(Distribution::new(d.values()).is_ok(), "{name}");
        }
        assert_eq!(presets.len(), 5);
    }

    #[test]
    fn test_add_replaces_by_name() {
        let mut presets = Presets::default();
        presets.add("Mine", HILL);
        presets.add("Mine", VALLEY);
        assert_eq!(presets.len(), 6);
        assert_eq!(presets.get("Mine"), Some(VALLEY));
        assert_eq!(presets.names().last(), Some("Mine"));
        assert_eq!(presets.get("Nope"), None);
    }
}

use std::collections::HashMap;

use crate::spec::Selection;

/// A named fragment definition.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub name: String,
    pub type_condition: String,
    pub selection_set: Vec<Selection>,
}

impl Fragment {
    pub fn new(
        name: impl Into<String>,
        type_condition: impl Into<String>,
        selection_set: Vec<Selection>,
    ) -> Self {
        Self {
            name: name.into(),
            type_condition: type_condition.into(),
            selection_set,
        }
    }
}

/// The named fragments available to an operation, looked up by spread name.
#[derive(Debug, Clone, Default)]
pub struct Fragments {
    map: HashMap<String, Fragment>,
}

impl Fragments {
    pub fn get(&self, key: &str) -> Option<&Fragment> {
        self.map.get(key)
    }

    pub fn insert(&mut self, fragment: Fragment) {
        self.map.insert(fragment.name.clone(), fragment);
    }
}

impl FromIterator<Fragment> for Fragments {
    fn from_iter<I: IntoIterator<Item = Fragment>>(iter: I) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|fragment| (fragment.name.clone(), fragment))
                .collect(),
        }
    }
}

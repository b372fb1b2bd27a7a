use std::collections::BTreeMap;

/// Parameters of one SD element, ordered by name.
pub type Params = BTreeMap<String, String>;

/// The STRUCTURED-DATA part of a message: `SD-ID → (PARAM-NAME → VALUE)`.
///
/// Elements and parameters are kept in sorted order so iteration is
/// deterministic. Inserting a parameter that already exists overwrites it,
/// and an element that repeats its SD-ID merges into the earlier one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructuredData {
  elements: BTreeMap<String, Params>,
}

impl StructuredData {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Make sure element `id` exists, even with no parameters.
  pub fn open(&mut self, id: &str) -> &mut Params {
    self.elements.entry(id.to_owned()).or_default()
  }

  /// Store `param = value` in element `id`. The last write wins.
  pub fn insert(&mut self, id: &str, param: &str, value: impl Into<String>) {
    let element = self.open(id);
    match element.get_mut(param) {
      Some(slot) => *slot = value.into(),
      None => {
        element.insert(param.to_owned(), value.into());
      }
    }
  }

  #[must_use]
  pub fn get(&self, id: &str, param: &str) -> Option<&str> {
    self.elements.get(id)?.get(param).map(String::as_str)
  }

  #[must_use]
  pub fn element(&self, id: &str) -> Option<&Params> {
    self.elements.get(id)
  }

  /// Number of SD elements.
  #[must_use]
  pub fn len(&self) -> usize {
    self.elements.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  /// Total number of parameters across all elements.
  #[must_use]
  pub fn param_count(&self) -> usize {
    self.elements.values().map(BTreeMap::len).sum()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Params)> {
    self.elements.iter().map(|(id, params)| (id.as_str(), params))
  }

  pub fn clear(&mut self) {
    self.elements.clear();
  }
}

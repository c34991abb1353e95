use std::collections::HashMap;

use crate::cast::Cast;
use crate::model::Value;
use crate::reader::ReaderKind;

/// One registered option: identity, reader kind, and the attributes attached
/// through the chained configuration calls.
#[derive(Debug)]
pub(crate) struct OptionSpec {
    name: String,
    kind: ReaderKind,
    cast: Option<Cast>,
    default: Option<Value>,
    label: Option<String>,
    multiple: bool,
    overwrite: bool,
}

impl OptionSpec {
    fn new(name: String, kind: ReaderKind) -> Self {
        Self {
            name,
            kind,
            cast: None,
            default: None,
            label: None,
            multiple: false,
            overwrite: false,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn kind(&self) -> ReaderKind {
        self.kind
    }

    pub(crate) fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub(crate) fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn multiple(&self) -> bool {
        self.multiple
    }

    pub(crate) fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub(crate) fn is_config(&self) -> bool {
        matches!(self.cast, Some(Cast::Config))
    }

    pub(crate) fn type_label(&self) -> &'static str {
        self.cast
            .as_ref()
            .map(Cast::type_label)
            .unwrap_or("option")
    }

    /// Run `value` through this option's cast, if any.
    pub(crate) fn apply_cast(&self, value: Value) -> Result<Value, crate::error::ArgumentError> {
        match &self.cast {
            Some(cast) => cast.apply(value),
            None => Ok(value),
        }
    }
}

/// Owns every option definition: names, aliases, reader kinds, casts,
/// defaults, multiplicity, the single unspecified-default designation, and
/// the hyphen/underscore name localization.
///
/// All mutation happens during the setup phase; parsing only reads.
/// Invalid references are programmer bugs and panic at the call site.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    specs: Vec<OptionSpec>,
    index: HashMap<String, usize>,
    aliases: HashMap<char, String>,
    source_to_alias: HashMap<String, char>,
    unspecified_default: Option<String>,
    to_underscore: bool,
    // canonical key -> original spelling, for label rendering
    originals: HashMap<String, String>,
}

impl Registry {
    /// Enable hyphen-to-underscore conversion of externally visible keys.
    /// Applies to names registered from this point on.
    pub(crate) fn underscore(&mut self) {
        self.to_underscore = true;
    }

    /// The externally visible key for `name`.
    pub(crate) fn localize(&self, name: &str) -> String {
        if self.to_underscore {
            name.replace('-', "_")
        } else {
            name.to_string()
        }
    }

    /// The original spelling behind a canonical key; inverse of
    /// [`localize`](Registry::localize) for every registered key.
    pub(crate) fn unlocalize(&self, key: &str) -> String {
        self.originals
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// # Panics
    /// When `name` is already registered.
    pub(crate) fn register(&mut self, name: &str, kind: ReaderKind) -> String {
        let canonical = self.localize(name);

        if self.index.contains_key(&canonical) {
            panic!("multiple types specified for '{canonical}'");
        }

        self.index.insert(canonical.clone(), self.specs.len());
        self.specs.push(OptionSpec::new(canonical.clone(), kind));

        if canonical != name {
            self.originals.insert(canonical.clone(), name.to_string());
        }

        canonical
    }

    pub(crate) fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.index.get(name).map(|index| &self.specs[*index])
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// # Panics
    /// When `name` is not a registered option.
    pub(crate) fn ensure_known(&self, name: &str) {
        if !self.contains(name) {
            panic!("'{name}' not known");
        }
    }

    /// Registration order.
    pub(crate) fn specs(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter()
    }

    fn spec_mut(&mut self, name: &str) -> &mut OptionSpec {
        let index = match self.index.get(name) {
            Some(index) => *index,
            None => panic!("'{name}' not known"),
        };
        &mut self.specs[index]
    }

    /// # Panics
    /// When `source` is unknown, or `alias` is already bound to another source.
    pub(crate) fn add_shorthand(&mut self, source: &str, alias: char) {
        self.ensure_known(source);

        if let Some(bound) = self.aliases.get(&alias) {
            panic!("'{alias}' already shorthand for '{bound}'");
        }

        self.aliases.insert(alias, source.to_string());
        self.source_to_alias.insert(source.to_string(), alias);
    }

    pub(crate) fn resolve_alias(&self, alias: char) -> Option<&str> {
        self.aliases.get(&alias).map(String::as_str)
    }

    pub(crate) fn alias_of(&self, source: &str) -> Option<char> {
        self.source_to_alias.get(source).copied()
    }

    pub(crate) fn set_default(&mut self, name: &str, value: Value) {
        self.spec_mut(name).default = Some(value);
    }

    pub(crate) fn set_multiple(&mut self, name: &str) {
        self.spec_mut(name).multiple = true;
    }

    pub(crate) fn set_cast(&mut self, name: &str, cast: Cast) {
        self.spec_mut(name).cast = Some(cast);
    }

    pub(crate) fn set_label(&mut self, name: &str, label: String) {
        self.spec_mut(name).label = Some(label);
    }

    /// # Panics
    /// When `name` is not a config option.
    pub(crate) fn set_overwrite(&mut self, name: &str) {
        let spec = self.spec_mut(name);

        if !spec.is_config() {
            panic!("'{name}' is not a config option");
        }

        spec.overwrite = true;
    }

    /// # Panics
    /// When another option already holds the unspecified-default slot.
    pub(crate) fn set_unspecified_default(&mut self, name: &str) {
        self.ensure_known(name);

        if let Some(holder) = &self.unspecified_default {
            panic!("trying to specify multiple unspecified defaults ('{holder}', '{name}')");
        }

        self.unspecified_default = Some(name.to_string());
    }

    pub(crate) fn unspecified_default(&self) -> Option<&str> {
        self.unspecified_default.as_deref()
    }
}

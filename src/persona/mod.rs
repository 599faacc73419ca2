//! Reply identities selected by recipient alias.
//!
//! Every alias delivers into the same inbox; the local part of the address the
//! mail was sent to decides which persona answers it.

mod builtin;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use builtin::{DEFAULT_PERSONA_KEY, builtin_personas};

/// A named reply identity. Personas differ only in data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Lowercase local part of the alias address (`henry` for `henry@askian.net`).
    pub key: String,
    pub display_name: String,
    pub address: String,
    /// System instructions handed to the completion service.
    pub instructions: String,
    pub sign_off: String,
}

impl Persona {
    pub fn new(
        key: &str,
        display_name: &str,
        address: &str,
        instructions: &str,
        sign_off: &str,
    ) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            display_name: display_name.to_string(),
            address: address.to_ascii_lowercase(),
            instructions: instructions.to_string(),
            sign_off: sign_off.to_string(),
        }
    }

    /// Domain part of the persona address, used for fresh `Message-ID`s.
    pub fn domain(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map_or("localhost", |(_, domain)| domain)
    }
}

/// Immutable alias-key to persona lookup table with a designated default.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: BTreeMap<String, Persona>,
    default_key: String,
}

impl PersonaRegistry {
    /// Build a registry. Keys must be unique and the default must be present.
    pub fn new(personas: Vec<Persona>, default_key: &str) -> Result<Self, ConfigError> {
        let mut table = BTreeMap::new();
        for mut persona in personas {
            persona.key.make_ascii_lowercase();
            persona.address.make_ascii_lowercase();
            let key = persona.key.clone();
            if key.is_empty() || key.contains('@') {
                return Err(ConfigError::Validation(format!(
                    "persona key {key:?} must be a non-empty address local part"
                )));
            }
            if table.insert(key.clone(), persona).is_some() {
                return Err(ConfigError::DuplicatePersona(key));
            }
        }

        let default_key = default_key.to_ascii_lowercase();
        if !table.contains_key(&default_key) {
            return Err(ConfigError::MissingDefaultPersona(default_key));
        }

        Ok(Self {
            personas: table,
            default_key,
        })
    }

    /// Built-in personas, with `overrides` replacing or extending them by key.
    pub fn with_overrides(overrides: Vec<Persona>, default_key: &str) -> Result<Self, ConfigError> {
        let mut merged: BTreeMap<String, Persona> = builtin_personas()
            .into_iter()
            .map(|p| (p.key.clone(), p))
            .collect();

        let mut seen = std::collections::BTreeSet::new();
        for persona in overrides {
            let key = persona.key.to_ascii_lowercase();
            if !seen.insert(key.clone()) {
                return Err(ConfigError::DuplicatePersona(key));
            }
            merged.insert(key, persona);
        }

        Self::new(merged.into_values().collect(), default_key)
    }

    pub fn get(&self, key: &str) -> Option<&Persona> {
        self.personas.get(&key.to_ascii_lowercase())
    }

    pub fn default_persona(&self) -> &Persona {
        // Presence is checked in `new`.
        &self.personas[&self.default_key]
    }

    /// Resolve a full address to a persona by its local part.
    pub fn for_address(&self, address: &str) -> Option<&Persona> {
        let local = address.split('@').next()?.trim();
        if local.is_empty() || !address.contains('@') {
            return None;
        }
        self.get(local)
    }

    /// Every reply address the agent sends from.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.personas.values().map(|p| p.address.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.values()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

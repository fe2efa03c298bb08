use std::collections::HashMap;

use scarif_format::IdMap;

use crate::legacy::MAX_LEGACY_ID;

/// Why an id could not be carried over to the target mapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    #[error("#{0} is not in the source mapping")]
    UnknownId(i16),

    #[error("#{id} ({name}) has no match in the target mapping")]
    NoMatch { id: i16, name: String },

    #[error("#{id} ({name}) maps to #{target}, which does not fit in 12 bits")]
    TooLarge { id: i16, name: String, target: i16 },
}

/// Translates ids of one mapping into ids of another by block name.
pub struct Translator<'a> {
    source: &'a IdMap,
    target: HashMap<&'a str, i16>,
}

impl<'a> Translator<'a> {
    pub fn new(source: &'a IdMap, target: &'a IdMap) -> Self {
        Self {
            source,
            target: target.name_index(),
        }
    }

    pub fn translate(&self, id: i16) -> Result<i16, TranslationError> {
        let name = self.source.get(id).ok_or(TranslationError::UnknownId(id))?;
        let target = *self.target.get(name).ok_or_else(|| TranslationError::NoMatch {
            id,
            name: name.to_string(),
        })?;
        if !(0..=MAX_LEGACY_ID as i16).contains(&target) {
            return Err(TranslationError::TooLarge {
                id,
                name: name.to_string(),
                target,
            });
        }
        Ok(target)
    }
}

//! Minimal BEM "origin" naming: `block__elem_mod_val`.
//!
//! Only what the default walker and the default entity caption need: parse a
//! file stem into an [`Entity`] and render it back.

use std::fmt;

pub const ELEM_DELIM: &str = "__";
pub const MOD_DELIM: char = '_';

/// A modifier of a block or element. `value` is `None` for boolean modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Modifier {
    pub name: String,
    pub value: Option<String>,
}

/// Identity of a block, element or modifier, independent of tech and level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    pub block: String,
    pub elem: Option<String>,
    pub modifier: Option<Modifier>,
}

impl Entity {
    pub fn block(block: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            elem: None,
            modifier: None,
        }
    }

    pub fn with_elem(mut self, elem: impl Into<String>) -> Self {
        self.elem = Some(elem.into());
        self
    }

    pub fn with_mod(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.modifier = Some(Modifier {
            name: name.into(),
            value: value.map(str::to_string),
        });
        self
    }

    /// Parses an origin-naming string. Returns `None` for anything that is
    /// not a valid entity name.
    pub fn parse(input: &str) -> Option<Self> {
        let (head, elem_part) = match input.split_once(ELEM_DELIM) {
            Some((block, rest)) => (block, Some(rest)),
            None => (input, None),
        };

        let (block, modifier) = match elem_part {
            Some(_) => (head, None),
            None => split_modifier(head)?,
        };
        if !is_word(block) {
            return None;
        }

        let mut entity = Entity::block(block);
        entity.modifier = modifier;

        if let Some(rest) = elem_part {
            let (elem, modifier) = split_modifier(rest)?;
            if !is_word(elem) {
                return None;
            }
            entity.elem = Some(elem.to_string());
            entity.modifier = modifier;
        }

        Some(entity)
    }

    pub fn is_block(&self) -> bool {
        self.elem.is_none() && self.modifier.is_none()
    }
}

/// Splits `name_mod_val` into the name and its optional modifier.
fn split_modifier(input: &str) -> Option<(&str, Option<Modifier>)> {
    let mut parts = input.split(MOD_DELIM);
    let name = parts.next()?;
    let modifier = match (parts.next(), parts.next(), parts.next()) {
        (None, _, _) => None,
        (Some(mod_name), value, None) if is_word(mod_name) => {
            if value.is_some_and(|value| !is_word(value)) {
                return None;
            }
            Some(Modifier {
                name: mod_name.to_string(),
                value: value.map(str::to_string),
            })
        }
        _ => return None,
    };
    Some((name, modifier))
}

fn is_word(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.block)?;
        if let Some(elem) = &self.elem {
            write!(f, "{ELEM_DELIM}{elem}")?;
        }
        if let Some(modifier) = &self.modifier {
            write!(f, "{MOD_DELIM}{}", modifier.name)?;
            if let Some(value) = &modifier.value {
                write!(f, "{MOD_DELIM}{value}")?;
            }
        }
        Ok(())
    }
}

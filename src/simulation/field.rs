//! Field: the passive environment descriptor a Motion strategy reasons about.

use crate::molecular::field::MicrotubuleField;

/// The environment of the shared medium. The generic variant carries no
/// state; the microtubule variant owns a generated tube network (see
/// [`MicrotubuleField`]).
pub enum Field {
    Generic,
    Microtubule(MicrotubuleField),
}

impl Field {
    /// The tube network, when this field has one.
    pub fn microtubule(&self) -> Option<&MicrotubuleField> {
        match self {
            Field::Generic => None,
            Field::Microtubule(f) => Some(f),
        }
    }
}

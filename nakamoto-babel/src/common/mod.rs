//! Contains logic for mapping between the nested IR tree and its flat event stream.

pub mod flat_to_nested;
pub mod nested_to_flat;

/// The values held by the data and return stacks.
pub mod value;

/// The dictionary of defined words.
pub mod dictionary;

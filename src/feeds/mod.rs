pub(crate) mod assembler;
pub(crate) mod classifier;
pub(crate) mod flood;
pub(crate) mod impact;
pub(crate) mod parser;
pub(crate) mod zones;

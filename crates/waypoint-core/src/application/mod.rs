/// The coordinator tree and its dispatch loop
pub mod coordinator;

pub(crate) mod command;

pub(crate) mod gate;

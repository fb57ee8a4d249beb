use std::fmt::Debug;

use crate::cartridge::{Mapper, NesRom};

/// Source of user-provided mappers for boards the core does not implement.
///
/// Consulted only when the mapper id is unknown to the built-in registry.
/// Returning `None` falls through to [`crate::Error::UnsupportedMapper`].
///
/// # Example
/// ```
/// use famibus_core::{
///     bus::Origin,
///     cartridge::{Mapper, NesRom, Provider},
/// };
///
/// #[derive(Debug, Clone)]
/// struct FixedBank;
///
/// impl Mapper for FixedBank {
///     fn mapper_id(&self) -> u16 { 2 }
///     fn translate_address(&self, addr: u16, _origin: Origin) -> u16 { addr }
/// }
///
/// #[derive(Debug)]
/// struct MyBoards;
///
/// impl Provider for MyBoards {
///     fn get_mapper(&self, rom: &NesRom) -> Option<Box<dyn Mapper>> {
///         (rom.mapper_id() == 2).then(|| Box::new(FixedBank) as Box<dyn Mapper>)
///     }
/// }
/// ```
pub trait Provider: Debug {
    fn get_mapper(&self, rom: &NesRom) -> Option<Box<dyn Mapper>>;
}

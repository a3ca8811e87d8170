/// Tree decode command.
pub mod decode;
/// Format detection command.
pub mod detect;
/// Registered format listing command.
pub mod formats;
/// Object tree rendering.
pub mod print;
/// Module template listing command.
pub mod templates;
#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod util;

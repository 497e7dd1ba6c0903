//! Shared types for the sessiond session store.
//!
//! The central type is [`Value`], the closed variant every session field
//! carries, together with the text codec ([`encode`]/[`decode`]) that turns
//! a `Value` into the payload persisted in the external store and back.

mod codec;
mod error;
mod value;

pub use codec::{decode, encode};
pub use error::{DecodeError, EncodeError};
pub use value::Value;

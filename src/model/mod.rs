//! Package identity model.
//!
//! Value types naming a package release ([`PackageIdentifier`]) and
//! describing where to fetch it ([`ReleaseDescriptor`]).

mod identifier;
mod release;

pub use identifier::{
    BuildChannel, PackageIdentifier, ParseIdentifierError, Profile, validate_core_version,
};
pub use release::ReleaseDescriptor;

use std::fmt;

/// Anything the transfer engine can fetch.
pub trait RemoteResource {
    type Info: fmt::Display;

    fn url(&self) -> &str;

    /// File name to store the resource under.
    fn file_name(&self) -> String;

    /// Opaque token describing the resource, used for diagnostics.
    fn info(&self) -> &Self::Info;
}

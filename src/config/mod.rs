//! Static registries and on-disk configuration: the tool signature table,
//! the project manifest, and `configshift.toml` settings.
pub mod manifest;
pub mod settings;
pub mod signatures;
pub mod toml_loader;

pub use manifest::{DependencyKind, MANIFEST_FILE, PackageManifest};
pub use settings::Settings;
pub use signatures::{ConfigSignature, Layout, SIGNATURES, ToolFamily, ToolId};
